/// A parsed command tree. The engine only reads it.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Simple(SimpleCommand),
    Pipe(Box<AstNode>, Box<AstNode>),
    And(Box<AstNode>, Box<AstNode>),
    Or(Box<AstNode>, Box<AstNode>),
    // The right side is absent for a trailing separator (`cmd ;`, `cmd &`).
    SequentialEnd(Box<AstNode>, Option<Box<AstNode>>),
    Background(Box<AstNode>, Option<Box<AstNode>>),
    Subshell {
        body: Box<AstNode>,
        redirect: Redirection,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimpleCommand {
    pub argv: Vec<String>,
    /// `NAME=value` bindings visible only to this invocation.
    pub locals: Vec<(String, String)>,
    pub redirect: Redirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Redirection {
    pub input: InputRedirect,
    pub output: OutputRedirect,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputRedirect {
    #[default]
    None,
    File(String),
    /// Literal here-document text.
    HereDoc(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputRedirect {
    #[default]
    None,
    Truncate(String),
    Append(String),
}

impl Redirection {
    pub fn is_empty(&self) -> bool {
        self.input == InputRedirect::None && self.output == OutputRedirect::None
    }
}

impl SimpleCommand {
    pub fn new<S: AsRef<str>>(argv: &[S]) -> Self {
        SimpleCommand {
            argv: argv.iter().map(|s| s.as_ref().to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.argv.first().map(|s| s.as_str())
    }

    pub fn with_local(mut self, name: &str, value: &str) -> Self {
        self.locals.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_input_file(mut self, file: &str) -> Self {
        self.redirect.input = InputRedirect::File(file.to_string());
        self
    }

    pub fn with_here_doc(mut self, text: &str) -> Self {
        self.redirect.input = InputRedirect::HereDoc(text.to_string());
        self
    }

    pub fn with_output(mut self, file: &str) -> Self {
        self.redirect.output = OutputRedirect::Truncate(file.to_string());
        self
    }

    pub fn with_append(mut self, file: &str) -> Self {
        self.redirect.output = OutputRedirect::Append(file.to_string());
        self
    }

    pub fn into_node(self) -> AstNode {
        AstNode::Simple(self)
    }
}

impl AstNode {
    pub fn simple<S: AsRef<str>>(argv: &[S]) -> Self {
        AstNode::Simple(SimpleCommand::new(argv))
    }

    pub fn pipe(left: AstNode, right: AstNode) -> Self {
        AstNode::Pipe(Box::new(left), Box::new(right))
    }

    pub fn and(left: AstNode, right: AstNode) -> Self {
        AstNode::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: AstNode, right: AstNode) -> Self {
        AstNode::Or(Box::new(left), Box::new(right))
    }

    /// `left ; right`
    pub fn then(left: AstNode, right: Option<AstNode>) -> Self {
        AstNode::SequentialEnd(Box::new(left), right.map(Box::new))
    }

    /// `left & right`
    pub fn background(left: AstNode, right: Option<AstNode>) -> Self {
        AstNode::Background(Box::new(left), right.map(Box::new))
    }

    pub fn subshell(body: AstNode) -> Self {
        AstNode::Subshell {
            body: Box::new(body),
            redirect: Redirection::default(),
        }
    }

    pub fn subshell_with(body: AstNode, redirect: Redirection) -> Self {
        AstNode::Subshell {
            body: Box::new(body),
            redirect,
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, AstNode::SequentialEnd(..) | AstNode::Background(..))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AstNode::Simple(_) => "simple",
            AstNode::Pipe(..) => "pipe",
            AstNode::And(..) => "and",
            AstNode::Or(..) => "or",
            AstNode::SequentialEnd(..) => "sequential-end",
            AstNode::Background(..) => "background",
            AstNode::Subshell { .. } => "subshell",
        }
    }
}
