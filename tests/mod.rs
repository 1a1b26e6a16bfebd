mod pipeline_tests;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - pipeline_tests: extraction output through to the sent calendar mail
// - server_tests: the inbound webhook routes
// - smoke_tests: basic configuration and wiring checks
// Collaborator mocks live in mocks.rs and are pulled in by path.
