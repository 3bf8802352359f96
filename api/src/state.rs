use sea_orm::DatabaseConnection;
use services::AttendanceService;
use util::ws::WebSocketManager;

/// Shared handles every handler can reach through `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    ws: WebSocketManager,
    attendance: AttendanceService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, ws: WebSocketManager, attendance: AttendanceService) -> Self {
        Self { db, ws, attendance }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn ws(&self) -> &WebSocketManager {
        &self.ws
    }

    pub fn ws_clone(&self) -> WebSocketManager {
        self.ws.clone()
    }

    pub fn attendance(&self) -> &AttendanceService {
        &self.attendance
    }
}
