pub mod categories;
pub mod channels;
pub mod check;
pub mod run;
