use std::fmt;

/// A generated statement. Blocks own their body and are indented on render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Line(String),
    Block {
        open: String,
        body: Vec<Stmt>,
        close: String,
    },
    Blank,
}

impl Stmt {
    pub fn line(text: impl Into<String>) -> Self {
        Self::Line(text.into())
    }

    pub fn block(open: impl Into<String>, body: Vec<Stmt>, close: impl Into<String>) -> Self {
        Self::Block {
            open: open.into(),
            body,
            close: close.into(),
        }
    }
}

/// Wrapper for indented display of a value.
pub struct Indented<'a, T>(pub &'a str, pub &'a T);

impl fmt::Display for Indented<'_, Stmt> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Indented(indent, stmt) = self;
        match stmt {
            Stmt::Line(text) => writeln!(f, "{indent}{text}"),
            Stmt::Blank => writeln!(f),
            Stmt::Block { open, body, close } => {
                writeln!(f, "{indent}{open}")?;
                let deeper = format!("{indent}  ");
                for child in body {
                    write!(f, "{}", Indented(&deeper, child))?;
                }
                writeln!(f, "{indent}{close}")
            }
        }
    }
}

/// The generated test file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub statements: Vec<Stmt>,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", Indented("", stmt))?;
        }
        Ok(())
    }
}
