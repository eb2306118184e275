use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (users, green areas, trees)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                cpf         TEXT NOT NULL,
                nome        TEXT NOT NULL,
                email       TEXT NOT NULL UNIQUE,
                senha       TEXT NOT NULL,
                is_admin    INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE green_areas (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                nome        TEXT NOT NULL,
                descricao   TEXT,
                localizacao TEXT NOT NULL,
                latitude    REAL,
                longitude   REAL,
                responsavel TEXT,
                status      TEXT NOT NULL DEFAULT 'Ativa'
                            CHECK (status IN ('Ativa', 'Em Manutenção', 'Planejada')),
                imagem_url  TEXT,
                usuario_id  INTEGER NOT NULL REFERENCES users(id),
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE trees (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                nome_cientifico TEXT NOT NULL,
                nome_popular    TEXT,
                data_plantio    TEXT NOT NULL,
                estado_saude    TEXT NOT NULL
                                CHECK (estado_saude IN ('Saudável', 'Doente', 'Morrendo')),
                localizacao     TEXT NOT NULL,
                altura          REAL,
                diametro        REAL,
                latitude        REAL,
                longitude       REAL,
                imagem_url      TEXT,
                area_verde_id   INTEGER REFERENCES green_areas(id) ON DELETE SET NULL,
                usuario_id      INTEGER NOT NULL REFERENCES users(id),
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX idx_trees_created ON trees(created_at);
            CREATE INDEX idx_trees_area ON trees(area_verde_id);
            CREATE INDEX idx_green_areas_created ON green_areas(created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
