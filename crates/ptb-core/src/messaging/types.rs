use crate::domain::{GeoPoint, UserId};

/// Transport-agnostic incoming update.
///
/// Telegram-specific fields stay in the Telegram adapter.
#[derive(Clone, Debug, PartialEq)]
pub struct IncomingUpdate {
    pub user_id: UserId,
    pub kind: UpdateKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum UpdateKind {
    Command(Command),
    Text(String),
    Location(GeoPoint),
    /// Opaque reference of the first size variant the transport supplied.
    Photo(String),
    /// Selected action, echoed back verbatim from the action set.
    Action(String),
}

impl IncomingUpdate {
    pub fn new(user_id: UserId, kind: UpdateKind) -> Self {
        Self { user_id, kind }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Add,
    List,
    Nearby,
    Reset,
    Unknown(String),
}

impl Command {
    pub fn from_name(name: &str) -> Self {
        match name {
            "start" => Command::Start,
            "help" => Command::Help,
            "add" => Command::Add,
            "list" => Command::List,
            "nearby" => Command::Nearby,
            "reset" => Command::Reset,
            other => Command::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Add => "add",
            Command::List => "list",
            Command::Nearby => "nearby",
            Command::Reset => "reset",
            Command::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Command::Unknown(_))
    }
}

/// Parse `/cmd`, `/cmd@botname` or `/cmd args` into a command.
///
/// Returns `None` for text that is not a command at all.
pub fn parse_command(text: &str) -> Option<Command> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?.split('@').next().unwrap_or("");
    if name.is_empty() {
        return None;
    }
    Some(Command::from_name(&name.to_lowercase()))
}

/// True if `text` spells one of the bot's own commands.
pub fn is_reserved_token(text: &str) -> bool {
    parse_command(text).is_some_and(|c| c.is_known())
}

/// A labeled choice offered to the user. The label doubles as the action id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    CommitPlace,
    PreviewDraft,
    CancelAdding,
    CancelSearch,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::CommitPlace,
        Action::PreviewDraft,
        Action::CancelAdding,
        Action::CancelSearch,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::CommitPlace => "Save place",
            Action::PreviewDraft => "Preview",
            Action::CancelAdding => "Cancel adding",
            Action::CancelSearch => "Cancel search",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.label() == label)
    }
}

/// Ordered set of actions presented with a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionSet {
    pub actions: Vec<Action>,
}

impl ActionSet {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// Menu shown after every draft update.
    pub fn draft_menu() -> Self {
        Self::new(vec![
            Action::CommitPlace,
            Action::PreviewDraft,
            Action::CancelAdding,
        ])
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.actions.iter().map(|a| a.label())
    }
}
