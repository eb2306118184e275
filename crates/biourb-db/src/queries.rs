use crate::Database;
use crate::models::{AreaFields, AreaRow, StatsRow, TreeFields, TreeRow, UserRow};
use anyhow::Result;
use biourb_types::models::HealthStatus;
use rusqlite::{Connection, Row};

impl Database {
    // -- Users --

    /// Insert a user unless the email is already registered.
    /// Returns `None` when the email is taken. The first user ever registered
    /// becomes the administrator.
    pub fn create_user(
        &self,
        cpf: &str,
        nome: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            // Check and insert under the same lock so two registrations
            // cannot both pass the check.
            if query_user_by_email(conn, email)?.is_some() {
                return Ok(None);
            }

            conn.execute(
                "INSERT INTO users (cpf, nome, email, senha, is_admin)
                 VALUES (?1, ?2, ?3, ?4, NOT EXISTS (SELECT 1 FROM users))",
                (cpf, nome, email, password_hash),
            )?;
            Ok(Some(conn.last_insert_rowid()))
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, cpf, nome, email, senha, is_admin, created_at FROM users WHERE id = ?1",
                [id],
                user_from_row,
            )
            .optional()
        })
    }

    // -- Trees --

    pub fn insert_tree(&self, usuario_id: i64, fields: &TreeFields) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO trees (nome_cientifico, nome_popular, data_plantio, estado_saude,
                                    localizacao, altura, diametro, latitude, longitude,
                                    imagem_url, area_verde_id, usuario_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                rusqlite::params![
                    fields.nome_cientifico,
                    fields.nome_popular,
                    fields.data_plantio.format("%Y-%m-%d").to_string(),
                    fields.estado_saude.as_str(),
                    fields.localizacao,
                    fields.altura,
                    fields.diametro,
                    fields.latitude,
                    fields.longitude,
                    fields.imagem_url,
                    fields.area_verde_id,
                    usuario_id,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// All trees, newest first.
    pub fn list_trees(&self) -> Result<Vec<TreeRow>> {
        self.with_conn(query_trees)
    }

    /// Replace every mutable column of a tree. Returns the number of rows
    /// touched; zero when the id does not exist.
    pub fn update_tree(&self, id: i64, fields: &TreeFields) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE trees
                 SET nome_cientifico = ?1, nome_popular = ?2, data_plantio = ?3, estado_saude = ?4,
                     localizacao = ?5, altura = ?6, diametro = ?7, latitude = ?8, longitude = ?9,
                     imagem_url = ?10, area_verde_id = ?11
                 WHERE id = ?12",
                rusqlite::params![
                    fields.nome_cientifico,
                    fields.nome_popular,
                    fields.data_plantio.format("%Y-%m-%d").to_string(),
                    fields.estado_saude.as_str(),
                    fields.localizacao,
                    fields.altura,
                    fields.diametro,
                    fields.latitude,
                    fields.longitude,
                    fields.imagem_url,
                    fields.area_verde_id,
                    id,
                ],
            )?;
            Ok(changed)
        })
    }

    pub fn delete_tree(&self, id: i64) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM trees WHERE id = ?1", [id])?))
    }

    // -- Green areas --

    pub fn insert_area(&self, usuario_id: i64, fields: &AreaFields) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO green_areas (nome, descricao, localizacao, latitude, longitude,
                                          responsavel, status, imagem_url, usuario_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    fields.nome,
                    fields.descricao,
                    fields.localizacao,
                    fields.latitude,
                    fields.longitude,
                    fields.responsavel,
                    fields.status.as_str(),
                    fields.imagem_url,
                    usuario_id,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// All green areas with their tree counts, newest first.
    pub fn list_areas(&self) -> Result<Vec<AreaRow>> {
        self.with_conn(query_areas)
    }

    pub fn update_area(&self, id: i64, fields: &AreaFields) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE green_areas
                 SET nome = ?1, descricao = ?2, localizacao = ?3, latitude = ?4, longitude = ?5,
                     responsavel = ?6, status = ?7, imagem_url = ?8
                 WHERE id = ?9",
                rusqlite::params![
                    fields.nome,
                    fields.descricao,
                    fields.localizacao,
                    fields.latitude,
                    fields.longitude,
                    fields.responsavel,
                    fields.status.as_str(),
                    fields.imagem_url,
                    id,
                ],
            )?;
            Ok(changed)
        })
    }

    pub fn delete_area(&self, id: i64) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM green_areas WHERE id = ?1", [id])?))
    }

    // -- Stats --

    /// Four independent counts, recomputed on every call.
    pub fn stats(&self) -> Result<StatsRow> {
        self.with_conn(|conn| {
            let count = |sql: &str| -> Result<i64> { Ok(conn.query_row(sql, [], |r| r.get(0))?) };

            let healthy_trees = conn.query_row(
                "SELECT COUNT(*) FROM trees WHERE estado_saude = ?1",
                [HealthStatus::Healthy.as_str()],
                |r| r.get(0),
            )?;

            Ok(StatsRow {
                trees: count("SELECT COUNT(*) FROM trees")?,
                areas: count("SELECT COUNT(*) FROM green_areas")?,
                users: count("SELECT COUNT(*) FROM users")?,
                healthy_trees,
            })
        })
    }

    pub fn ping(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
            Ok(())
        })
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        cpf: row.get(1)?,
        nome: row.get(2)?,
        email: row.get(3)?,
        senha: row.get(4)?,
        is_admin: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    conn.query_row(
        "SELECT id, cpf, nome, email, senha, is_admin, created_at FROM users WHERE email = ?1",
        [email],
        user_from_row,
    )
    .optional()
}

fn query_trees(conn: &Connection) -> Result<Vec<TreeRow>> {
    // JOIN users for the registrant name, LEFT JOIN areas since the link is optional
    let mut stmt = conn.prepare(
        "SELECT t.id, t.nome_cientifico, t.nome_popular, t.data_plantio, t.estado_saude,
                t.localizacao, t.altura, t.diametro, t.latitude, t.longitude, t.imagem_url,
                t.area_verde_id, t.usuario_id, t.created_at, u.nome, a.nome
         FROM trees t
         JOIN users u ON t.usuario_id = u.id
         LEFT JOIN green_areas a ON t.area_verde_id = a.id
         ORDER BY t.created_at DESC, t.id DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(TreeRow {
                id: row.get(0)?,
                nome_cientifico: row.get(1)?,
                nome_popular: row.get(2)?,
                data_plantio: row.get(3)?,
                estado_saude: row.get(4)?,
                localizacao: row.get(5)?,
                altura: row.get(6)?,
                diametro: row.get(7)?,
                latitude: row.get(8)?,
                longitude: row.get(9)?,
                imagem_url: row.get(10)?,
                area_verde_id: row.get(11)?,
                usuario_id: row.get(12)?,
                created_at: row.get(13)?,
                nome_registrante: row.get(14)?,
                nome_area: row.get(15)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_areas(conn: &Connection) -> Result<Vec<AreaRow>> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.nome, a.descricao, a.localizacao, a.latitude, a.longitude,
                a.responsavel, a.status, a.imagem_url, a.usuario_id, a.created_at,
                u.nome, COUNT(t.id)
         FROM green_areas a
         JOIN users u ON a.usuario_id = u.id
         LEFT JOIN trees t ON t.area_verde_id = a.id
         GROUP BY a.id, u.nome
         ORDER BY a.created_at DESC, a.id DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(AreaRow {
                id: row.get(0)?,
                nome: row.get(1)?,
                descricao: row.get(2)?,
                localizacao: row.get(3)?,
                latitude: row.get(4)?,
                longitude: row.get(5)?,
                responsavel: row.get(6)?,
                status: row.get(7)?,
                imagem_url: row.get(8)?,
                usuario_id: row.get(9)?,
                created_at: row.get(10)?,
                nome_registrante: row.get(11)?,
                total_arvores: row.get(12)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
