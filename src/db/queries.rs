use rusqlite::{params, Connection, OptionalExtension};

use crate::policy::ViewerRole;
use crate::session::{Credentials, StoredSession, Viewer};

pub fn load_session(conn: &Connection) -> anyhow::Result<Option<StoredSession>> {
    let row = conn
        .query_row(
            "SELECT access_token, refresh_token, user_id, user_name, user_type FROM session WHERE id = 1",
            [],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            },
        )
        .optional()?;

    Ok(row.map(|(access_token, refresh_token, user_id, user_name, user_type)| {
        let viewer = match (user_id, user_type.as_deref().and_then(ViewerRole::parse)) {
            (Some(user_id), Some(role)) => Some(Viewer {
                user_id,
                name: user_name.unwrap_or_default(),
                role,
            }),
            _ => None,
        };
        StoredSession {
            credentials: Credentials {
                access_token,
                refresh_token,
            },
            viewer,
        }
    }))
}

pub fn save_session(conn: &Connection, session: &StoredSession) -> anyhow::Result<()> {
    let viewer = session.viewer.as_ref();
    conn.execute(
        "INSERT INTO session (id, access_token, refresh_token, user_id, user_name, user_type, updated_at)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, datetime('now'))
         ON CONFLICT(id) DO UPDATE SET
            access_token = excluded.access_token,
            refresh_token = excluded.refresh_token,
            user_id = excluded.user_id,
            user_name = excluded.user_name,
            user_type = excluded.user_type,
            updated_at = excluded.updated_at",
        params![
            session.credentials.access_token,
            session.credentials.refresh_token,
            viewer.map(|v| v.user_id),
            viewer.map(|v| v.name.as_str()),
            viewer.map(|v| v.role.as_str()),
        ],
    )?;
    Ok(())
}

pub fn clear_session(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("DELETE FROM session", [])?;
    Ok(())
}
