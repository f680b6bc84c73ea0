//! Initial database migration.
//!
//! Creates the contractor, catalog, project, estimate and entry tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: TENANTS & LOGIN
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(CONTRACTORS_SQL).await?;

        // ============================================================
        // PART 2: CATALOG
        // ============================================================
        db.execute_unprepared(CATALOG_SQL).await?;

        // ============================================================
        // PART 3: ESTIMATES & PROJECTS
        // ============================================================
        db.execute_unprepared(ESTIMATES_SQL).await?;
        db.execute_unprepared(PROJECTS_SQL).await?;

        // ============================================================
        // PART 4: USAGE ENTRIES
        // ============================================================
        db.execute_unprepared(ENTRIES_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE estimate_status AS ENUM ('draft', 'sent', 'accepted');
";

const CONTRACTORS_SQL: &str = r"
CREATE TABLE contractors (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    phone VARCHAR(50),
    logo_url TEXT,
    material_margin NUMERIC(5, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_material_margin CHECK (material_margin >= 0 AND material_margin < 100)
);

CREATE TABLE contractor_users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    contractor_id UUID NOT NULL REFERENCES contractors(id) ON DELETE CASCADE,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    last_login_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_contractor_users_contractor ON contractor_users(contractor_id);
";

const CATALOG_SQL: &str = r"
CREATE TABLE assets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    contractor_id UUID NOT NULL REFERENCES contractors(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    cost_rate NUMERIC(12, 2) NOT NULL CHECK (cost_rate >= 0),
    billable_rate NUMERIC(12, 2) NOT NULL CHECK (billable_rate >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE employees (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    contractor_id UUID NOT NULL REFERENCES contractors(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    cost_rate NUMERIC(12, 2) NOT NULL CHECK (cost_rate >= 0),
    billable_rate NUMERIC(12, 2) NOT NULL CHECK (billable_rate >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE materials (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    contractor_id UUID NOT NULL REFERENCES contractors(id) ON DELETE CASCADE,
    description VARCHAR(255) NOT NULL,
    unit VARCHAR(50) NOT NULL DEFAULT '',
    actual_cost NUMERIC(12, 2) NOT NULL CHECK (actual_cost >= 0),
    service_markup NUMERIC(5, 2) CHECK (service_markup >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_assets_contractor ON assets(contractor_id, name);
CREATE INDEX idx_employees_contractor ON employees(contractor_id, name);
CREATE INDEX idx_materials_contractor ON materials(contractor_id, description);
";

const ESTIMATES_SQL: &str = r"
CREATE TABLE estimates (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    contractor_id UUID NOT NULL REFERENCES contractors(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    customer_name VARCHAR(255) NOT NULL DEFAULT '',
    customer_email VARCHAR(255) NOT NULL DEFAULT '',
    notes TEXT NOT NULL DEFAULT '',
    status estimate_status NOT NULL DEFAULT 'draft',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_estimates_contractor ON estimates(contractor_id, created_at DESC);
";

const PROJECTS_SQL: &str = r"
CREATE TABLE projects (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    contractor_id UUID NOT NULL REFERENCES contractors(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE,
    estimate_id UUID REFERENCES estimates(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_project_dates CHECK (end_date IS NULL OR end_date >= start_date)
);

CREATE TABLE payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    amount NUMERIC(12, 2) NOT NULL,
    date DATE NOT NULL,
    notes TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_projects_contractor ON projects(contractor_id, start_date DESC);
CREATE UNIQUE INDEX idx_projects_estimate ON projects(estimate_id) WHERE estimate_id IS NOT NULL;
CREATE INDEX idx_payments_project ON payments(project_id, date);
";

const ENTRIES_SQL: &str = r"
CREATE TABLE job_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    date DATE NOT NULL,
    hours NUMERIC(10, 2) NOT NULL CHECK (hours >= 0),
    asset_id UUID REFERENCES assets(id) ON DELETE SET NULL,
    employee_id UUID REFERENCES employees(id) ON DELETE SET NULL,
    material_id UUID REFERENCES materials(id) ON DELETE SET NULL,
    material_description VARCHAR(255),
    material_unit VARCHAR(50),
    material_cost NUMERIC(12, 2) CHECK (material_cost >= 0),
    service_markup NUMERIC(5, 2) CHECK (service_markup >= 0),
    description TEXT NOT NULL DEFAULT '',
    cost_amount NUMERIC(12, 2),
    billable_amount NUMERIC(12, 2),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE estimate_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    estimate_id UUID NOT NULL REFERENCES estimates(id) ON DELETE CASCADE,
    hours NUMERIC(10, 2) NOT NULL CHECK (hours >= 0),
    asset_id UUID REFERENCES assets(id) ON DELETE SET NULL,
    employee_id UUID REFERENCES employees(id) ON DELETE SET NULL,
    material_id UUID REFERENCES materials(id) ON DELETE SET NULL,
    material_description VARCHAR(255),
    material_unit VARCHAR(50),
    material_cost NUMERIC(12, 2) CHECK (material_cost >= 0),
    service_markup NUMERIC(5, 2) CHECK (service_markup >= 0),
    description TEXT NOT NULL DEFAULT '',
    cost_amount NUMERIC(12, 2),
    billable_amount NUMERIC(12, 2),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_job_entries_project ON job_entries(project_id, date);
CREATE INDEX idx_estimate_entries_estimate ON estimate_entries(estimate_id);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION touch_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_contractors_updated_at BEFORE UPDATE ON contractors
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_estimates_updated_at BEFORE UPDATE ON estimates
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_job_entries_updated_at BEFORE UPDATE ON job_entries
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_estimate_entries_updated_at BEFORE UPDATE ON estimate_entries
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS estimate_entries CASCADE;
DROP TABLE IF EXISTS job_entries CASCADE;
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS projects CASCADE;
DROP TABLE IF EXISTS estimates CASCADE;
DROP TABLE IF EXISTS materials CASCADE;
DROP TABLE IF EXISTS employees CASCADE;
DROP TABLE IF EXISTS assets CASCADE;
DROP TABLE IF EXISTS contractor_users CASCADE;
DROP TABLE IF EXISTS contractors CASCADE;
DROP FUNCTION IF EXISTS touch_updated_at() CASCADE;
DROP TYPE IF EXISTS estimate_status;
";
