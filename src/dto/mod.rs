pub mod assignment_dto;
pub mod attempt_dto;
pub mod dashboard_dto;
pub mod test_dto;
