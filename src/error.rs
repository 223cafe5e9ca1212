pub mod process_error;
