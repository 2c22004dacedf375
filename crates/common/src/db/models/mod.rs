//! SeaORM entity models

mod file;

pub use file::{
    Entity as FileEntity,
    Model as FileRecord,
    ActiveModel as FileActiveModel,
    Column as FileColumn,
};
