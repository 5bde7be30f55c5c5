mod progress;
mod selection;
mod service;
mod view;

// Public API of the quiz session subsystem.
pub use crate::error::{PreconditionError, QuizError};
pub use progress::{PageResult, QuizProgress, percent};
pub use selection::GroupSelection;
pub use service::{QuizPhase, QuizSession};
pub use view::{OptionMark, OptionView, PageView, QuestionView};
