#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tempfile::TempDir;

/// The seven tables of the legacy fest management database.
pub const SOURCE_SCHEMA: &str = "
CREATE TABLE users (
    email TEXT PRIMARY KEY,
    full_name TEXT,
    phone TEXT,
    department TEXT,
    year_of_study INTEGER,
    role TEXT,
    interests TEXT,
    is_verified INTEGER DEFAULT 0,
    created_at TEXT
);
CREATE TABLE events (
    event_id TEXT PRIMARY KEY,
    fest_id TEXT,
    title TEXT NOT NULL,
    description TEXT,
    venue TEXT,
    start_time TEXT,
    end_time TEXT,
    capacity INTEGER,
    fee REAL,
    tags TEXT,
    schedule TEXT,
    is_team_event INTEGER DEFAULT 0,
    is_published INTEGER DEFAULT 0,
    organizer_email TEXT,
    created_at TEXT
);
CREATE TABLE fests (
    fest_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    start_date TEXT,
    end_date TEXT,
    sponsors TEXT,
    contacts TEXT,
    is_active INTEGER DEFAULT 1,
    created_at TEXT
);
CREATE TABLE registrations (
    registration_id TEXT PRIMARY KEY,
    event_id TEXT NOT NULL,
    user_email TEXT NOT NULL,
    team_name TEXT,
    team_members TEXT,
    custom_answers TEXT,
    qr_code TEXT,
    status TEXT,
    is_checked_in INTEGER DEFAULT 0,
    registered_at TEXT
);
CREATE TABLE attendance_status (
    registration_id TEXT NOT NULL,
    event_id TEXT NOT NULL,
    is_present INTEGER DEFAULT 0,
    marked_by TEXT,
    marked_at TEXT
);
CREATE TABLE notifications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_email TEXT,
    title TEXT,
    message TEXT,
    is_read INTEGER DEFAULT 0,
    created_at TEXT
);
CREATE TABLE qr_scan_logs (
    registration_id TEXT,
    event_id TEXT,
    scanned_by TEXT,
    scan_result TEXT,
    is_valid INTEGER,
    scan_metadata TEXT,
    scanned_at TEXT
);
";

pub const SEED_ROWS: &str = r#"
INSERT INTO users VALUES
    ('ada@campus.edu', 'Ada Lovelace', '555-0101', 'CSE', 3, 'student', '["robotics","music"]', 1, '2024-01-10 09:00:00'),
    ('bob@campus.edu', 'Bob Byte', NULL, 'ECE', 2, 'student', NULL, 0, '2024-01-11 10:30:00'),
    ('cy@campus.edu', 'Cy Coordinator', '555-0103', 'ME', 4, 'organizer', '', 1, '2024-01-12 08:15:00');

INSERT INTO fests VALUES
    ('fest-2024', 'TechFest 2024', 'Annual technical festival', '2024-03-01', '2024-03-03',
     '[{"name":"Acme","tier":"gold"}]', '{"email":"fest@campus.edu"}', 1, '2024-01-01 00:00:00');

INSERT INTO events VALUES
    ('evt-hack', 'fest-2024', 'Hackathon', '24h build sprint', 'Lab 1', '2024-03-01 10:00:00',
     '2024-03-02 10:00:00', 120, 0.0, '["coding","teams"]', '{"rounds":[1,2]}', 1, 1, 'cy@campus.edu', '2024-01-15 12:00:00'),
    ('evt-quiz', 'fest-2024', 'Tech Quiz', NULL, 'Hall A', '2024-03-02 14:00:00',
     '2024-03-02 16:00:00', 60, 50.5, NULL, NULL, 0, 1, 'cy@campus.edu', '2024-01-16 12:00:00');

INSERT INTO registrations VALUES
    ('reg-001', 'evt-hack', 'ada@campus.edu', 'Analytical Engines', '["ada@campus.edu","bob@campus.edu"]',
     '{"tshirt":"M"}', 'QR-001', 'confirmed', 1, '2024-02-01 09:00:00'),
    ('reg-002', 'evt-quiz', 'bob@campus.edu', NULL, NULL, NULL, 'QR-002', 'registered', 0, '2024-02-02 09:00:00');

INSERT INTO attendance_status VALUES
    ('reg-001', 'evt-hack', 1, 'cy@campus.edu', '2024-03-01 10:05:00'),
    ('reg-002', 'evt-quiz', 0, 'cy@campus.edu', '2024-03-02 14:10:00');

INSERT INTO qr_scan_logs VALUES
    ('reg-001', 'evt-hack', 'cy@campus.edu', 'accepted', 1, '{"gate":"north"}', '2024-03-01 10:04:00'),
    ('reg-001', 'evt-hack', 'cy@campus.edu', 'duplicate', 0, NULL, '2024-03-01 10:06:00'),
    ('reg-002', 'evt-quiz', 'cy@campus.edu', 'accepted', 1, '', '2024-03-02 14:09:00');

INSERT INTO notifications (user_email, title, message, is_read, created_at) VALUES
    ('ada@campus.edu', 'Welcome', 'Thanks for registering', 0, '2024-02-01 09:01:00');
"#;

/// A seeded source database file inside a temporary directory.
pub struct SourceFixture {
    _dir: TempDir,
    pub path: PathBuf,
}

impl SourceFixture {
    pub fn seeded() -> Self {
        Self::with_sql(&format!("{SOURCE_SCHEMA}{SEED_ROWS}"))
    }

    pub fn empty() -> Self {
        Self::with_sql(SOURCE_SCHEMA)
    }

    pub fn with_sql(sql: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("fest_management.db");
        let conn = Connection::open(&path).expect("create source db");
        conn.execute_batch(sql).expect("seed source db");
        Self { _dir: dir, path }
    }

    /// Run extra statements against the fixture between migrations.
    pub fn execute(&self, sql: &str) {
        let conn = Connection::open(&self.path).expect("reopen source db");
        conn.execute_batch(sql).expect("execute fixture sql");
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
