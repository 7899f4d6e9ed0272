mod checker;
mod common;
