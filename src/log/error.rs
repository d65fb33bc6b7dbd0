use super::{Pointer, RED, RESET};
use crate::{
    log::Visual,
    region::{Position, Region},
};
use std::fmt::{Debug, Display, Formatter, Result};

/// Describes the stage that produced an [`Error`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// Failure while turning source text into tokens.
    Lex,
    /// Failure while building the syntax tree.
    Parse,
    /// Failure while emitting opcodes.
    Compile,
    /// Reserved for the execution stage, never produced by this crate.
    Runtime,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ErrorKind::Lex => write!(f, "lex"),
            ErrorKind::Parse => write!(f, "parse"),
            ErrorKind::Compile => write!(f, "compile"),
            ErrorKind::Runtime => write!(f, "runtime"),
        }
    }
}

/// Describes an error, and allows adding a contextual help text and visualization.
///
/// # Examples
///
/// Creating an [`Error`] that includes a [`Visual`] of type [`Pointer`]:
///
/// ```
/// use stache::Error;
///
/// Error::parse("unexpected token")
///     .with_pointer("{{#each}}{{/with}}", 12..16)
///     .with_name("template.hbs")
///     .with_help("expected `each`");
/// ```
///
/// When printed with `println!("{:#}", error)` the [`Error`] produces this output:
///
/// ```text
/// parse error: unexpected token
///   --> template.hbs:1:13
///    |
///  1 | {{#each}}{{/with}}
///    |             ^^^^
///    |
///   = help: expected `each`
/// ```
pub struct Error {
    /// The stage that produced the [`Error`].
    kind: ErrorKind,
    /// Describes the cause of the [`Error`].
    reason: String,
    /// Location in the source text, when the cause has one.
    position: Option<Position>,
    /// A visualization to help illustrate the [`Error`].
    visual: Option<Box<dyn Visual>>,
    /// Additional information to display with the [`Error`].
    help: Option<String>,
    /// The name of the template that the [`Error`] comes from.
    name: Option<String>,
}

impl Error {
    /// Create a new [`Error`] of the given kind with the given reason text.
    ///
    /// The additional fields may be populated using the various methods
    /// defined on `Error`.
    pub fn build<T>(kind: ErrorKind, reason: T) -> Self
    where
        T: Into<String>,
    {
        Error {
            kind,
            reason: reason.into(),
            position: None,
            visual: None,
            help: None,
            name: None,
        }
    }

    /// Create a new [`Error`] of kind [`ErrorKind::Lex`].
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::{Error, ErrorKind};
    ///
    /// let error = Error::lex("unexpected eof").with_help("did you close the mustache?");
    /// assert_eq!(error.kind(), ErrorKind::Lex);
    /// ```
    #[inline]
    pub fn lex<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Self::build(ErrorKind::Lex, reason)
    }

    /// Create a new [`Error`] of kind [`ErrorKind::Parse`].
    #[inline]
    pub fn parse<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Self::build(ErrorKind::Parse, reason)
    }

    /// Create a new [`Error`] of kind [`ErrorKind::Compile`].
    #[inline]
    pub fn compile<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Self::build(ErrorKind::Compile, reason)
    }

    /// Set the reason text, which is a short summary of the [`Error`].
    pub fn with_reason<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.reason = text.into();

        self
    }

    /// Set the name text, which is the name of the template that the
    /// [`Error`] is related to.
    pub fn with_name<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(text.into());

        self
    }

    /// Set the [`Visual`], which is a visualization that helps illustrate the
    /// cause of the error.
    pub fn with_visual(mut self, visual: impl Visual + 'static) -> Self {
        self.visual = Some(Box::new(visual));

        self
    }

    /// Set the visualization to a new [`Pointer`] with the given source text and
    /// [`Region`], and record the [`Position`] of the `Region`.
    ///
    /// This is a shortcut method for creating a `Pointer` yourself and then
    /// setting it to the `with_visual` method.
    pub fn with_pointer<T>(mut self, source: &str, region: T) -> Self
    where
        T: Into<Region>,
    {
        let region = region.into();
        self.position = Some(Position::locate(source, region.begin));
        self.visual = Some(Box::new(Pointer::new(source, region)));

        self
    }

    /// Set the help text, which is contextual information to accompany the
    /// reason text.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(text.into());

        self
    }

    /// Return the stage that produced the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return the reason text.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Return the help text.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Return the location of the error within the source text.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Return the name of the template that the error is related to.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Return a plain one line description, without color or visual.
    ///
    /// ```text
    /// parse error: `foo` doesn't match `bar` at 1:4
    /// ```
    pub fn message(&self) -> String {
        match self.position {
            Some(position) => format!("{} error: {} at {position}", self.kind, self.reason),
            None => format!("{} error: {}", self.kind, self.reason),
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if !f.alternate() {
            writeln!(f, "{self:#}")?;
        }
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("reason", &self.reason)
            .field("position", &self.position)
            .field("name", &self.name)
            .field("visual", &self.visual)
            .field("help", &self.help)
            .finish()?;

        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if !f.alternate() {
            return write!(f, "{} error: {}", self.kind, self.reason);
        }

        write!(f, "{RED}{} error{RESET}: {}", self.kind, self.reason)?;
        match &self.visual {
            Some(visual) => visual.display(f, self.name.as_deref(), self.help.as_deref()),
            None => match &self.help {
                Some(help) => write!(f, "\n  = help: {help}\n"),
                None => Ok(()),
            },
        }
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.reason == other.reason
            && self.help == other.help
            && self.name == other.name
            && self.position == other.position
    }
}
