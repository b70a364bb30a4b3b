/// All catalog service primary keys are integer row ids.
pub type DbId = i64;
