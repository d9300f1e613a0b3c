use std::path::Path;

use festsync_common::Result;
use tracing::info;

/// PostgreSQL schema for the destination project. Must be applied by hand
/// (SQL editor or `psql`) before migrating; this tool never runs DDL.
pub const DESTINATION_SCHEMA: &str = r#"-- festsync destination schema
-- Apply in the Supabase SQL editor before running `festsync migrate`.

CREATE EXTENSION IF NOT EXISTS "pgcrypto";

CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email TEXT NOT NULL UNIQUE,
    full_name TEXT,
    phone TEXT,
    department TEXT,
    year_of_study INTEGER,
    role TEXT,
    interests JSONB,
    is_verified BOOLEAN DEFAULT FALSE,
    created_at TIMESTAMPTZ DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS events (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    event_id TEXT NOT NULL UNIQUE,
    fest_id TEXT,
    title TEXT NOT NULL,
    description TEXT,
    venue TEXT,
    start_time TIMESTAMPTZ,
    end_time TIMESTAMPTZ,
    capacity INTEGER,
    fee NUMERIC,
    tags JSONB,
    schedule JSONB,
    is_team_event BOOLEAN DEFAULT FALSE,
    is_published BOOLEAN DEFAULT FALSE,
    organizer_email TEXT,
    created_at TIMESTAMPTZ DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS fests (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    fest_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT,
    start_date DATE,
    end_date DATE,
    sponsors JSONB,
    contacts JSONB,
    is_active BOOLEAN DEFAULT TRUE,
    created_at TIMESTAMPTZ DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS registrations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    registration_id TEXT NOT NULL UNIQUE,
    event_id TEXT NOT NULL,
    user_email TEXT NOT NULL,
    team_name TEXT,
    team_members JSONB,
    custom_answers JSONB,
    qr_code TEXT,
    status TEXT DEFAULT 'registered',
    is_checked_in BOOLEAN DEFAULT FALSE,
    registered_at TIMESTAMPTZ DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS attendance_status (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    registration_id TEXT NOT NULL,
    event_id TEXT NOT NULL,
    is_present BOOLEAN DEFAULT FALSE,
    marked_by TEXT,
    marked_at TIMESTAMPTZ DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS qr_scan_logs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    registration_id TEXT,
    event_id TEXT,
    scanned_by TEXT,
    scan_result TEXT,
    is_valid BOOLEAN DEFAULT FALSE,
    scan_metadata JSONB,
    scanned_at TIMESTAMPTZ DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_events_fest_id ON events(fest_id);
CREATE INDEX IF NOT EXISTS idx_registrations_event_id ON registrations(event_id);
CREATE INDEX IF NOT EXISTS idx_registrations_user_email ON registrations(user_email);
CREATE INDEX IF NOT EXISTS idx_attendance_registration_id ON attendance_status(registration_id);
CREATE INDEX IF NOT EXISTS idx_attendance_event_id ON attendance_status(event_id);
CREATE INDEX IF NOT EXISTS idx_scan_logs_registration_id ON qr_scan_logs(registration_id);
CREATE INDEX IF NOT EXISTS idx_scan_logs_event_id ON qr_scan_logs(event_id);

ALTER TABLE users ENABLE ROW LEVEL SECURITY;
ALTER TABLE events ENABLE ROW LEVEL SECURITY;
ALTER TABLE fests ENABLE ROW LEVEL SECURITY;
ALTER TABLE registrations ENABLE ROW LEVEL SECURITY;
ALTER TABLE attendance_status ENABLE ROW LEVEL SECURITY;
ALTER TABLE qr_scan_logs ENABLE ROW LEVEL SECURITY;

CREATE POLICY "Allow all access to users" ON users FOR ALL USING (true) WITH CHECK (true);
CREATE POLICY "Allow all access to events" ON events FOR ALL USING (true) WITH CHECK (true);
CREATE POLICY "Allow all access to fests" ON fests FOR ALL USING (true) WITH CHECK (true);
CREATE POLICY "Allow all access to registrations" ON registrations FOR ALL USING (true) WITH CHECK (true);
CREATE POLICY "Allow all access to attendance_status" ON attendance_status FOR ALL USING (true) WITH CHECK (true);
CREATE POLICY "Allow all access to qr_scan_logs" ON qr_scan_logs FOR ALL USING (true) WITH CHECK (true);
"#;

/// Write [`DESTINATION_SCHEMA`] to `path`, creating parent directories.
pub fn write_schema_script(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, DESTINATION_SCHEMA)?;
    info!("destination schema written to {}", path.display());
    Ok(())
}
