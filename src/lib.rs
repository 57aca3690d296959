pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use crate::database::SharedStore;
use crate::services::{
    assignment_service::AssignmentService, attempt_service::AttemptService,
    dashboard_service::DashboardService, results_service::ResultsService,
    test_service::TestService,
};

#[derive(Clone)]
pub struct AppState {
    pub jwt_secret: Arc<str>,
    pub test_service: TestService,
    pub assignment_service: AssignmentService,
    pub attempt_service: AttemptService,
    pub results_service: ResultsService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub fn new(store: SharedStore, jwt_secret: &str) -> Self {
        Self {
            test_service: TestService::new(store.clone()),
            assignment_service: AssignmentService::new(store.clone()),
            attempt_service: AttemptService::new(store.clone()),
            results_service: ResultsService::new(store.clone()),
            dashboard_service: DashboardService::new(store),
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}
