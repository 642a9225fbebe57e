pub mod definition_tests;
pub mod registry_tests;
