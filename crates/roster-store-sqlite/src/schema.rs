//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Reference tables. Rows here are owned by the employee/project/team modules;
-- the scheduler only reads them.
CREATE TABLE IF NOT EXISTS employees (
    employee_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    hire_date   TEXT    NOT NULL,            -- YYYY-MM-DD
    is_active   INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS projects (
    project_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT    NOT NULL,
    is_active  INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS teams (
    team_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT    NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS schedule_statuses (
    status_id INTEGER PRIMARY KEY AUTOINCREMENT,
    code      TEXT    NOT NULL UNIQUE,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS schedules (
    schedule_id INTEGER PRIMARY KEY AUTOINCREMENT,
    employee_id INTEGER NOT NULL REFERENCES employees(employee_id),
    project_id  INTEGER REFERENCES projects(project_id),
    team_id     INTEGER REFERENCES teams(team_id),
    status_id   INTEGER REFERENCES schedule_statuses(status_id),
    date        TEXT    NOT NULL,            -- YYYY-MM-DD
    start_time  TEXT,                        -- HH:MM:SS; NULL with end_time = full day
    end_time    TEXT,                        -- HH:MM:SS; earlier than start = overnight
    confirmed   INTEGER NOT NULL DEFAULT 0,
    location    TEXT,
    notes       TEXT,
    created_at  TEXT    NOT NULL,            -- RFC 3339 UTC
    updated_at  TEXT    NOT NULL,
    CHECK ((start_time IS NULL) = (end_time IS NULL)),
    CHECK (start_time IS NULL OR start_time != end_time)
);

CREATE INDEX IF NOT EXISTS schedules_employee_date_idx ON schedules(employee_id, date);
CREATE INDEX IF NOT EXISTS schedules_date_idx          ON schedules(date);
CREATE INDEX IF NOT EXISTS schedules_project_idx       ON schedules(project_id);
CREATE INDEX IF NOT EXISTS schedules_team_idx          ON schedules(team_id);

PRAGMA user_version = 1;
";
