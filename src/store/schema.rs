//! DDL for the SQLite backend.
//!
//! Reference tables (`cities`, `pillars`, `questions` and the evaluator score tables)
//! are maintained by other systems; they are created here so a fresh database is usable.

pub const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS cities (
        city_id INTEGER PRIMARY KEY,
        city_name TEXT NOT NULL,
        state TEXT NOT NULL DEFAULT '',
        country TEXT NOT NULL DEFAULT '',
        is_deleted INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pillars (
        pillar_id INTEGER PRIMARY KEY,
        pillar_name TEXT NOT NULL,
        display_order INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS questions (
        question_id INTEGER PRIMARY KEY,
        pillar_id INTEGER NOT NULL REFERENCES pillars (pillar_id),
        question_text TEXT NOT NULL,
        display_order INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS evaluator_question_scores (
        city_id INTEGER NOT NULL,
        question_id INTEGER NOT NULL,
        score_progress REAL,
        normalized_value REAL,
        PRIMARY KEY (city_id, question_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS evaluator_pillar_scores (
        city_id INTEGER NOT NULL,
        pillar_id INTEGER NOT NULL,
        score REAL,
        PRIMARY KEY (city_id, pillar_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS evaluator_city_scores (
        city_id INTEGER PRIMARY KEY,
        score REAL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS question_evaluations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        city_id INTEGER NOT NULL,
        pillar_id INTEGER NOT NULL,
        question_id INTEGER NOT NULL,
        year INTEGER NOT NULL,
        ai_score REAL NOT NULL,
        ai_progress REAL NOT NULL,
        evaluator_score REAL,
        discrepancy REAL NOT NULL,
        confidence_level TEXT NOT NULL,
        data_sources_used INTEGER NOT NULL DEFAULT 0,
        evidence_summary TEXT NOT NULL DEFAULT '',
        red_flags TEXT NOT NULL DEFAULT '',
        geographic_equity_note TEXT NOT NULL DEFAULT '',
        source_type TEXT NOT NULL,
        source_name TEXT NOT NULL,
        source_url TEXT NOT NULL,
        source_data_year INTEGER,
        source_data_extract TEXT NOT NULL,
        source_trust_level INTEGER NOT NULL,
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (city_id, pillar_id, question_id, year)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pillar_evaluations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        city_id INTEGER NOT NULL,
        pillar_id INTEGER NOT NULL,
        year INTEGER NOT NULL,
        ai_score REAL NOT NULL,
        ai_progress REAL NOT NULL,
        evaluator_score REAL,
        discrepancy REAL NOT NULL,
        confidence_level TEXT NOT NULL,
        evidence_summary TEXT NOT NULL DEFAULT '',
        red_flags TEXT NOT NULL DEFAULT '',
        geographic_equity_note TEXT NOT NULL DEFAULT '',
        institutional_assessment TEXT NOT NULL DEFAULT '',
        data_gap_analysis TEXT NOT NULL DEFAULT '',
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (city_id, pillar_id, year)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pillar_evaluation_sources (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        city_id INTEGER NOT NULL,
        data_year INTEGER NOT NULL,
        pillar_id INTEGER NOT NULL,
        source_type TEXT NOT NULL,
        source_name TEXT NOT NULL,
        source_url TEXT NOT NULL,
        data_extract TEXT NOT NULL,
        trust_level INTEGER NOT NULL,
        source_data_year INTEGER
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_pillar_evaluation_sources_owner
        ON pillar_evaluation_sources (city_id, pillar_id, data_year)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS city_evaluations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        city_id INTEGER NOT NULL,
        year INTEGER NOT NULL,
        ai_score REAL NOT NULL,
        ai_progress REAL NOT NULL,
        evaluator_score REAL,
        discrepancy REAL NOT NULL,
        confidence_level TEXT NOT NULL,
        evidence_summary TEXT NOT NULL DEFAULT '',
        cross_pillar_patterns TEXT NOT NULL DEFAULT '',
        institutional_capacity TEXT NOT NULL DEFAULT '',
        equity_assessment TEXT NOT NULL DEFAULT '',
        sustainability_outlook TEXT NOT NULL DEFAULT '',
        strategic_recommendations TEXT NOT NULL DEFAULT '',
        data_transparency_note TEXT NOT NULL DEFAULT '',
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (city_id, year)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS app_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        level TEXT NOT NULL,
        message TEXT NOT NULL,
        exception TEXT,
        created_at TEXT NOT NULL
    )
    "#,
];

pub const QUESTION_VIEW: &str = "vw_city_pillar_question_evaluations";
pub const PILLAR_VIEW: &str = "vw_city_pillar_evaluations";
pub const CITY_VIEW: &str = "vw_city_evaluations";

pub const VIEWS: &[&str] = &[
    r#"
    CREATE VIEW IF NOT EXISTS vw_city_pillar_question_evaluations AS
    SELECT c.city_id,
           p.pillar_id,
           p.pillar_name,
           q.question_id,
           q.question_text,
           s.score_progress,
           s.normalized_value,
           p.display_order AS pillar_order,
           q.display_order AS question_order
    FROM cities c
    CROSS JOIN questions q
    JOIN pillars p ON p.pillar_id = q.pillar_id
    LEFT JOIN evaluator_question_scores s
        ON s.city_id = c.city_id AND s.question_id = q.question_id
    WHERE c.is_deleted = 0
    "#,
    r#"
    CREATE VIEW IF NOT EXISTS vw_city_pillar_evaluations AS
    SELECT c.city_id,
           p.pillar_id,
           p.pillar_name,
           (SELECT group_concat(
                       q.question_text || ': ' ||
                       CASE WHEN s.score_progress IS NULL THEN 'no evaluator score'
                            ELSE printf('%.1f%%', s.score_progress) END,
                       char(10))
              FROM questions q
              LEFT JOIN evaluator_question_scores s
                  ON s.city_id = c.city_id AND s.question_id = q.question_id
             WHERE q.pillar_id = p.pillar_id) AS questions_with_scores,
           eps.score AS evaluator_score,
           (SELECT pe.ai_score
              FROM pillar_evaluations pe
             WHERE pe.city_id = c.city_id AND pe.pillar_id = p.pillar_id
             ORDER BY pe.year DESC
             LIMIT 1) AS ai_score,
           p.display_order AS pillar_order
    FROM cities c
    CROSS JOIN pillars p
    LEFT JOIN evaluator_pillar_scores eps
        ON eps.city_id = c.city_id AND eps.pillar_id = p.pillar_id
    WHERE c.is_deleted = 0
    "#,
    r#"
    CREATE VIEW IF NOT EXISTS vw_city_evaluations AS
    SELECT c.city_id,
           ecs.score AS evaluator_score,
           (SELECT ce.ai_score
              FROM city_evaluations ce
             WHERE ce.city_id = c.city_id
             ORDER BY ce.year DESC
             LIMIT 1) AS ai_score,
           (SELECT group_concat(
                       p.pillar_name || ': ' ||
                       CASE WHEN eps.score IS NULL THEN 'no evaluator score'
                            ELSE printf('%.2f/4', eps.score) END,
                       char(10))
              FROM pillars p
              LEFT JOIN evaluator_pillar_scores eps
                  ON eps.city_id = c.city_id AND eps.pillar_id = p.pillar_id) AS pillars_with_scores
    FROM cities c
    LEFT JOIN evaluator_city_scores ecs ON ecs.city_id = c.city_id
    WHERE c.is_deleted = 0
    "#,
];
