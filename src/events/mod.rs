pub mod navigation;
pub mod pointer;
