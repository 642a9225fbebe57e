pub mod types_tests;
