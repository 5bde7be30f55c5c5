#![forbid(unsafe_code)]

pub mod bank_service;
pub mod error;
pub mod sessions;
pub mod settings;

pub use bank_service::{BankLoader, DEFAULT_GROUPS_TABLE, DEFAULT_QUESTIONS_TABLE};
pub use error::{LoadError, PreconditionError, QuizError, SettingsError};
pub use settings::{DEFAULT_PAGE_SIZE, QuizSettings};

pub use sessions::{
    GroupSelection, OptionMark, OptionView, PageResult, PageView, QuestionView, QuizPhase,
    QuizProgress, QuizSession,
};
