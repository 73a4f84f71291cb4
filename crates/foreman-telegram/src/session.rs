//! Per-chat conversation state.
//!
//! Every multi-step dialogue is a variant of [`Conversation`]. Input is first
//! read into a [`Step`] for the current state, then [`Conversation::advance`]
//! decides the next state. Input that does not fit the state is rejected and
//! the state is kept.

use chrono::NaiveDate;

use foreman_core::{parse_deadline, parse_status};
use foreman_models::TaskStatus;

/// Fields collected by the task creation dialogue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    /// Raw title, possibly starting with a task code.
    pub title: String,
    pub deadline: Option<NaiveDate>,
    pub object: Option<String>,
    pub source: Option<String>,
}

/// Where a chat is in a dialogue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Conversation {
    #[default]
    Idle,
    AddName,
    AddDeadline {
        draft: TaskDraft,
    },
    AddObject {
        draft: TaskDraft,
    },
    AddSource {
        draft: TaskDraft,
    },
    StatusCode,
    StatusValue {
        code: String,
    },
    /// Browsing the structure; `None` is the top level.
    PhotoBrowse {
        path: Option<String>,
    },
    PhotoAwaitImage {
        path: String,
    },
    PhotoComment {
        path: String,
        file_id: String,
    },
}

/// One piece of input, already interpreted for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Name(String),
    Deadline(Option<NaiveDate>),
    Object(Option<String>),
    Source(Option<String>),
    Code(String),
    Status(TaskStatus),
    Navigate(Option<String>),
    Choose(String),
    Photo(String),
    Comment(Option<String>),
}

/// Work to do once a dialogue is complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    CreateTask(TaskDraft),
    SetStatus {
        code: String,
        status: TaskStatus,
    },
    RecordPhoto {
        path: String,
        file_id: String,
        comment: Option<String>,
    },
}

/// Result of feeding a step to a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Next(Conversation),
    Done(Outcome),
    /// The step does not belong to this state; the state is unchanged.
    Rejected(Conversation),
}

/// `-` and `—` mean "no value".
pub fn is_skip(text: &str) -> bool {
    matches!(text.trim(), "" | "-" | "—")
}

fn optional(text: &str) -> Option<String> {
    (!is_skip(text)).then(|| text.trim().to_string())
}

impl Conversation {
    pub fn is_idle(&self) -> bool {
        matches!(self, Conversation::Idle)
    }

    /// The transition table.
    pub fn advance(self, step: Step) -> Advance {
        use Conversation as C;

        match (self, step) {
            (C::AddName, Step::Name(title)) => Advance::Next(C::AddDeadline {
                draft: TaskDraft {
                    title,
                    ..TaskDraft::default()
                },
            }),
            (C::AddDeadline { mut draft }, Step::Deadline(deadline)) => {
                draft.deadline = deadline;
                Advance::Next(C::AddObject { draft })
            }
            (C::AddObject { mut draft }, Step::Object(object)) => {
                draft.object = object;
                Advance::Next(C::AddSource { draft })
            }
            (C::AddSource { mut draft }, Step::Source(source)) => {
                draft.source = source;
                Advance::Done(Outcome::CreateTask(draft))
            }
            (C::StatusCode, Step::Code(code)) => Advance::Next(C::StatusValue { code }),
            (C::StatusValue { code }, Step::Status(status)) => {
                Advance::Done(Outcome::SetStatus { code, status })
            }
            (C::PhotoBrowse { .. }, Step::Navigate(path)) => Advance::Next(C::PhotoBrowse { path }),
            (C::PhotoBrowse { .. }, Step::Choose(path)) => Advance::Next(C::PhotoAwaitImage { path }),
            (C::PhotoAwaitImage { path }, Step::Photo(file_id)) => {
                Advance::Next(C::PhotoComment { path, file_id })
            }
            (C::PhotoComment { path, file_id }, Step::Comment(comment)) => {
                Advance::Done(Outcome::RecordPhoto {
                    path,
                    file_id,
                    comment,
                })
            }
            (state, _) => Advance::Rejected(state),
        }
    }

    /// Interpret a text message for this state.
    ///
    /// `Err` carries the corrective message for the user.
    pub fn read_text(&self, text: &str) -> Result<Step, String> {
        let text = text.trim();
        match self {
            Conversation::Idle => Err("Nothing in progress. Use /help to see the commands.".into()),
            Conversation::AddName => {
                if text.is_empty() {
                    Err("The task name cannot be empty. Send the task name.".into())
                } else {
                    Ok(Step::Name(text.to_string()))
                }
            }
            Conversation::AddDeadline { .. } => {
                if is_skip(text) {
                    return Ok(Step::Deadline(None));
                }
                parse_deadline(text).map(|d| Step::Deadline(Some(d))).ok_or_else(|| {
                    "Could not read that date. Use YYYY-MM-DD, DD.MM.YYYY, today, tomorrow or - for none."
                        .into()
                })
            }
            Conversation::AddObject { .. } => Ok(Step::Object(optional(text))),
            Conversation::AddSource { .. } => Ok(Step::Source(optional(text))),
            Conversation::StatusCode => {
                if text.is_empty() || text.contains(char::is_whitespace) {
                    Err("Send a single task ID, for example INTEL-034.".into())
                } else {
                    Ok(Step::Code(text.to_uppercase()))
                }
            }
            Conversation::StatusValue { .. } => {
                parse_status(text).map(Step::Status).map_err(|e| e.to_string())
            }
            Conversation::PhotoBrowse { .. } => {
                Err("Pick a section with the buttons, or /cancel.".into())
            }
            Conversation::PhotoAwaitImage { .. } => {
                Err("Send a photo for the chosen section, or /cancel.".into())
            }
            Conversation::PhotoComment { .. } => Ok(Step::Comment(optional(text))),
        }
    }

    /// The prompt shown when entering this state.
    pub fn prompt(&self) -> &'static str {
        match self {
            Conversation::Idle => "Done.",
            Conversation::AddName => {
                "Send the task name. Start it with a code (e.g. INTEL-034 — Check facade) to set the ID."
            }
            Conversation::AddDeadline { .. } => {
                "Deadline? YYYY-MM-DD, DD.MM.YYYY, today, tomorrow or - for none."
            }
            Conversation::AddObject { .. } => "Object (site or area)? Send - for none.",
            Conversation::AddSource { .. } => "Source?",
            Conversation::StatusCode => "Send the task ID.",
            Conversation::StatusValue { .. } => "Choose the new status.",
            Conversation::PhotoBrowse { .. } => "Choose a section:",
            Conversation::PhotoAwaitImage { .. } => "Now send the photo.",
            Conversation::PhotoComment { .. } => "Add a comment, or - for none.",
        }
    }
}
