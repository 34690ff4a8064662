//! Correction profile persistence.
//!
//! One row per profile: identity, name, the aggregated parameter set as
//! JSON, and a creation timestamp. The JSON column is the same wire shape
//! the rest of the system speaks, so profiles stored by older builds keep
//! deserializing (unknown grading/filter names degrade to no-ops, absent
//! fields stay absent).

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::models::{AdjustmentParameters, CorrectionProfile};

use super::DatabaseError;

pub fn insert_profile(conn: &Connection, profile: &CorrectionProfile) -> Result<(), DatabaseError> {
    let parameters = serde_json::to_string(&profile.parameters).map_err(|e| {
        DatabaseError::CorruptParameters {
            id: profile.id.to_string(),
            reason: e.to_string(),
        }
    })?;

    conn.execute(
        "INSERT INTO correction_profiles (id, name, parameters, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            profile.id.to_string(),
            profile.name,
            parameters,
            profile.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_profile(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<CorrectionProfile>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, parameters, created_at
             FROM correction_profiles WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    row.map(profile_from_row).transpose()
}

/// All profiles, newest first.
pub fn list_profiles(conn: &Connection) -> Result<Vec<CorrectionProfile>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, parameters, created_at
         FROM correction_profiles ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut profiles = Vec::new();
    for row in rows {
        profiles.push(profile_from_row(row?)?);
    }
    Ok(profiles)
}

pub fn rename_profile(conn: &Connection, id: &Uuid, name: &str) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE correction_profiles SET name = ?1 WHERE id = ?2",
        params![name, id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "correction_profile".to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_profile(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM correction_profiles WHERE id = ?1",
        params![id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "correction_profile".to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn profile_from_row(
    (id, name, parameters, created_at): (String, String, String, String),
) -> Result<CorrectionProfile, DatabaseError> {
    let parsed_id = Uuid::parse_str(&id).map_err(|e| DatabaseError::CorruptParameters {
        id: id.clone(),
        reason: format!("bad uuid: {e}"),
    })?;
    let parameters: AdjustmentParameters =
        serde_json::from_str(&parameters).map_err(|e| DatabaseError::CorruptParameters {
            id: id.clone(),
            reason: e.to_string(),
        })?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| DatabaseError::CorruptParameters {
            id: id.clone(),
            reason: format!("bad timestamp: {e}"),
        })?
        .with_timezone(&Utc);

    Ok(CorrectionProfile {
        id: parsed_id,
        name,
        parameters,
        created_at,
    })
}
