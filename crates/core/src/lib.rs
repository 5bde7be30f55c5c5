#![forbid(unsafe_code)]

pub mod model;

pub use model::{
    ALL_GROUP, Group, IdRange, Question, QuestionBank, QuestionError, QuestionId, RangeError, Row,
};
