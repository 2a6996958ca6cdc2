/// Idempotent schema applied on every open.
pub(super) const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS companies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    town TEXT,
    route TEXT,
    rating TEXT,
    full_rating TEXT,
    industry TEXT,
    website TEXT,
    logo_url TEXT,
    is_external INTEGER NOT NULL DEFAULT 0
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_companies_register_identity
    ON companies (name, IFNULL(town, ''), IFNULL(route, ''))
    WHERE is_external = 0;
CREATE INDEX IF NOT EXISTS idx_companies_name ON companies (name);

CREATE TABLE IF NOT EXISTS applications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
    company_id INTEGER NOT NULL REFERENCES companies (id),
    role TEXT NOT NULL,
    status TEXT NOT NULL,
    applied_date TEXT NOT NULL,
    follow_up_date TEXT,
    follow_up_completed INTEGER NOT NULL DEFAULT 0,
    notes TEXT,
    salary TEXT,
    external_website TEXT,
    cv_version TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_applications_user ON applications (user_id);

CREATE TABLE IF NOT EXISTS application_updates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    application_id INTEGER NOT NULL REFERENCES applications (id) ON DELETE CASCADE,
    kind TEXT NOT NULL,
    note TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_application_updates_application
    ON application_updates (application_id);

CREATE TABLE IF NOT EXISTS import_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL,
    status TEXT NOT NULL,
    count INTEGER,
    error TEXT,
    created_at TEXT NOT NULL
);
"#;
