// Role and capability value objects

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Technician,
    Viewer,
    SiteManager,
    Driver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Technician => "technician",
            Role::Viewer => "viewer",
            Role::SiteManager => "site_manager",
            Role::Driver => "driver",
        }
    }

    /// Roles whose data scope is the whole fleet.
    pub fn sees_all_data(&self) -> bool {
        matches!(
            self,
            Role::Admin | Role::Manager | Role::Viewer | Role::Technician
        )
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            Role::Admin => Capabilities::all(),
            Role::Manager => Capabilities {
                can_manage_users: false,
                can_delete_records: false,
                ..Capabilities::all()
            },
            Role::Technician => Capabilities {
                can_view_compliance: true,
                can_view_maintenance: true,
                can_view_reports: true,
                can_view_refills: true,
                can_edit_maintenance: true,
                can_manage_email_reports: true,
                ..Capabilities::none()
            },
            Role::Viewer => Capabilities {
                can_view_compliance: true,
                can_view_maintenance: true,
                can_view_reports: true,
                can_view_costs: true,
                can_view_refills: true,
                can_manage_email_reports: true,
                ..Capabilities::none()
            },
            Role::SiteManager => Capabilities {
                can_view_compliance: true,
                can_view_maintenance: true,
                can_view_reports: true,
                can_view_costs: true,
                can_view_refills: true,
                can_edit_vehicles: true,
                can_edit_maintenance: true,
                can_export_data: true,
                can_manage_email_reports: true,
                ..Capabilities::none()
            },
            Role::Driver => Capabilities {
                can_view_compliance: true,
                ..Capabilities::none()
            },
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            "technician" => Role::Technician,
            "site_manager" | "sitemanager" => Role::SiteManager,
            "driver" => Role::Driver,
            _ => Role::Viewer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub can_view_compliance: bool,
    pub can_view_maintenance: bool,
    pub can_view_reports: bool,
    pub can_view_costs: bool,
    pub can_view_refills: bool,
    pub can_manage_sites: bool,
    pub can_manage_users: bool,
    pub can_edit_vehicles: bool,
    pub can_edit_maintenance: bool,
    pub can_edit_sites: bool,
    pub can_delete_records: bool,
    pub can_export_data: bool,
    pub can_generate_ai_reports: bool,
    pub can_manage_email_reports: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            can_view_compliance: true,
            can_view_maintenance: true,
            can_view_reports: true,
            can_view_costs: true,
            can_view_refills: true,
            can_manage_sites: true,
            can_manage_users: true,
            can_edit_vehicles: true,
            can_edit_maintenance: true,
            can_edit_sites: true,
            can_delete_records: true,
            can_export_data: true,
            can_generate_ai_reports: true,
            can_manage_email_reports: true,
        }
    }

    pub fn none() -> Self {
        Self {
            can_view_compliance: false,
            can_view_maintenance: false,
            can_view_reports: false,
            can_view_costs: false,
            can_view_refills: false,
            can_manage_sites: false,
            can_manage_users: false,
            can_edit_vehicles: false,
            can_edit_maintenance: false,
            can_edit_sites: false,
            can_delete_records: false,
            can_export_data: false,
            can_generate_ai_reports: false,
            can_manage_email_reports: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_falls_back_to_viewer() {
        assert_eq!(Role::from("ADMIN"), Role::Admin);
        assert_eq!(Role::from(" site_manager "), Role::SiteManager);
        assert_eq!(Role::from("contractor"), Role::Viewer);
    }

    #[test]
    fn manager_cannot_manage_users() {
        let caps = Role::Manager.capabilities();
        assert!(caps.can_view_refills);
        assert!(caps.can_manage_sites);
        assert!(!caps.can_manage_users);
        assert!(!caps.can_delete_records);
    }

    #[test]
    fn driver_only_sees_compliance() {
        let caps = Role::Driver.capabilities();
        assert!(caps.can_view_compliance);
        assert!(!caps.can_view_refills);
        assert!(!caps.can_manage_email_reports);
    }
}
