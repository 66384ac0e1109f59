use crate::schema::*;
use chrono::{DateTime, Utc};
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, IsNull, Output, ToSql},
    sql_types::Text,
};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Enums persisted as `TEXT` columns. The macro keeps the wire (serde) and
/// database spellings in lockstep with a single string per variant.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            Serialize, Deserialize, AsExpression, FromSqlRow,
        )]
        #[diesel(sql_type = Text)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant,)+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(anyhow::anyhow!(
                        concat!("unknown ", stringify!($name), ": {}"),
                        other
                    )),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromSql<Text, Pg> for $name {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
                s.parse().map_err(|e: anyhow::Error| e.into())
            }
        }

        impl ToSql<Text, Pg> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                out.write_all(self.as_str().as_bytes())?;
                Ok(IsNull::No)
            }
        }
    };
}

text_enum! {
    EventStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Cancelled => "cancelled",
        Published => "published",
    }
}

impl EventStatus {
    /// Terminal events accept no further verdicts.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EventStatus::Pending)
    }
}

text_enum! {
    ApprovalStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

text_enum! {
    BookingStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

text_enum! {
    RsvpStatus {
        Attending => "attending",
        Maybe => "maybe",
        NotAttending => "not_attending",
    }
}

impl RsvpStatus {
    /// Whether this response holds one of the event's capacity slots.
    /// `not_attending` frees the slot.
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, RsvpStatus::NotAttending)
    }
}

text_enum! {
    RegistrationType {
        Audience => "audience",
        Participant => "participant",
        Volunteer => "volunteer",
    }
}

impl Default for RegistrationType {
    fn default() -> Self {
        RegistrationType::Audience
    }
}

text_enum! {
    VerificationStatus {
        Pending => "pending",
        Verified => "verified",
        Attended => "attended",
    }
}

text_enum! {
    MaintenanceStatus {
        Good => "good",
        NeedsRepair => "needs_repair",
        OutOfOrder => "out_of_order",
    }
}

text_enum! {
    Role {
        Student => "student",
        ClubMember => "club_member",
        ClubHead => "club_head",
        Teacher => "teacher",
        Hod => "hod",
        Registrar => "registrar",
        FinancialHead => "financial_head",
        TechnicalStaff => "technical_staff",
        Admin => "admin",
    }
}

text_enum! {
    ApproverRole {
        Teacher => "teacher",
        Registrar => "registrar",
        FinancialHead => "financial_head",
    }
}

impl From<ApproverRole> for Role {
    fn from(r: ApproverRole) -> Role {
        match r {
            ApproverRole::Teacher => Role::Teacher,
            ApproverRole::Registrar => Role::Registrar,
            ApproverRole::FinancialHead => Role::FinancialHead,
        }
    }
}

impl Role {
    /// The approval-workflow seat this role can fill, if any.
    pub fn as_approver(&self) -> Option<ApproverRole> {
        match self {
            Role::Teacher => Some(ApproverRole::Teacher),
            Role::Registrar => Some(ApproverRole::Registrar),
            Role::FinancialHead => Some(ApproverRole::FinancialHead),
            _ => None,
        }
    }

    /// Roles whose verdict bypasses the quorum and sets the event status
    /// directly.
    pub fn can_override_approvals(&self) -> bool {
        matches!(self, Role::Admin | Role::Hod)
    }
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub max_attendees: Option<i32>,
    pub budget: Option<i64>,
    pub status: EventStatus,
    pub organizer_id: i32,
    pub club_id: Option<i32>,
    pub requires_approval: bool,
    pub division_restriction: Option<String>,
    pub department_restriction: Option<String>,
    pub equipment_required: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventApproval {
    pub id: i32,
    pub event_id: i32,
    pub approver_id: Option<i32>,
    /// Seats are seeded with [`ApproverRole`]s; admin/hod override verdicts
    /// land here with their own role.
    pub approver_role: Role,
    pub status: ApprovalStatus,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRsvp {
    pub id: i32,
    pub event_id: i32,
    pub user_id: i32,
    pub user_email: String,
    pub status: RsvpStatus,
    pub registration_type: RegistrationType,
    pub rsvp_number: String,
    pub form_data: Option<serde_json::Value>,
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: i32,
    pub name: String,
    pub capacity: i32,
    pub location: Option<String>,
    pub is_available: bool,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = equipment)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: i32,
    pub name: String,
    pub quantity: i32,
    pub available_quantity: i32,
    pub maintenance_status: MaintenanceStatus,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// A venue reservation (`resource_bookings` table).
#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = resource_bookings)]
#[serde(rename_all = "camelCase")]
pub struct VenueBooking {
    pub id: i32,
    pub venue_id: i32,
    pub event_id: Option<i32>,
    pub user_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentBooking {
    pub id: i32,
    pub equipment_id: i32,
    pub event_id: Option<i32>,
    pub user_id: i32,
    pub quantity: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_enums_round_trip() {
        assert_eq!(
            "financial_head".parse::<Role>().unwrap(),
            Role::FinancialHead
        );
        assert_eq!(Role::TechnicalStaff.as_str(), "technical_staff");
        assert_eq!(
            "not_attending".parse::<RsvpStatus>().unwrap(),
            RsvpStatus::NotAttending
        );
        assert!("organizer".parse::<Role>().is_err());
    }

    #[test]
    fn event_status_terminality() {
        assert!(!EventStatus::Pending.is_terminal());
        assert!(EventStatus::Approved.is_terminal());
        assert!(EventStatus::Rejected.is_terminal());
        assert!(EventStatus::Cancelled.is_terminal());
    }

    #[test]
    fn approver_seats() {
        assert_eq!(Role::Teacher.as_approver(), Some(ApproverRole::Teacher));
        assert_eq!(Role::Student.as_approver(), None);
        assert!(Role::Admin.can_override_approvals());
        assert!(!Role::Registrar.can_override_approvals());
    }
}
