pub mod assignment_service;
pub mod attempt_service;
pub mod dashboard_service;
pub mod grading_service;
pub mod results_service;
pub mod test_service;
pub mod user_service;
