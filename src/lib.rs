pub mod dap;
pub mod debugger;
pub mod log;
pub mod ui;
