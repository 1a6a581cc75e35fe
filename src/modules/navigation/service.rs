use serde::Serialize;
use utoipa::ToSchema;

use dashgate_models::AppRole;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MenuItem {
    #[schema(value_type = String)]
    pub key: &'static str,
    #[schema(value_type = String)]
    pub title: &'static str,
    /// Front-end route
    #[schema(value_type = String)]
    pub path: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NavigationMenu {
    pub role: AppRole,
    pub main: Vec<MenuItem>,
    pub admin: Vec<MenuItem>,
}

struct MenuEntry {
    item: MenuItem,
    roles: &'static [AppRole],
}

const EVERYONE: &[AppRole] = &[AppRole::AdminMaster, AppRole::Admin, AppRole::User];
const ADMINS: &[AppRole] = &[AppRole::AdminMaster, AppRole::Admin];
const ADMIN_MASTER: &[AppRole] = &[AppRole::AdminMaster];

const MAIN_MENU: &[MenuEntry] = &[
    MenuEntry {
        item: MenuItem { key: "home", title: "Home", path: "/" },
        roles: EVERYONE,
    },
    MenuEntry {
        item: MenuItem { key: "powerbi", title: "Power BI", path: "/powerbi" },
        roles: EVERYONE,
    },
    MenuEntry {
        item: MenuItem { key: "tv_dashboards", title: "TV Dashboards", path: "/tv-published" },
        roles: ADMINS,
    },
];

const ADMIN_MENU: &[MenuEntry] = &[
    MenuEntry {
        item: MenuItem {
            key: "dashboard_management",
            title: "Dashboard Management",
            path: "/dashboard-management",
        },
        roles: ADMIN_MASTER,
    },
    MenuEntry {
        item: MenuItem {
            key: "tv_management",
            title: "TV Management",
            path: "/tv-presentations",
        },
        roles: ADMIN_MASTER,
    },
    MenuEntry {
        item: MenuItem { key: "users", title: "Users", path: "/users" },
        roles: ADMIN_MASTER,
    },
    MenuEntry {
        item: MenuItem {
            key: "powerbi_clients",
            title: "Power BI Clients",
            path: "/clients",
        },
        roles: ADMIN_MASTER,
    },
];

fn visible_to(entries: &[MenuEntry], role: AppRole) -> Vec<MenuItem> {
    entries
        .iter()
        .filter(|entry| entry.roles.contains(&role))
        .map(|entry| entry.item.clone())
        .collect()
}

pub struct NavigationService;

impl NavigationService {
    /// The sidebar entries `role` may see, in display order.
    pub fn menu_for(role: AppRole) -> NavigationMenu {
        NavigationMenu {
            role,
            main: visible_to(MAIN_MENU, role),
            admin: visible_to(ADMIN_MENU, role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[MenuItem]) -> Vec<&'static str> {
        items.iter().map(|i| i.key).collect()
    }

    #[test]
    fn test_admin_master_sees_everything() {
        let menu = NavigationService::menu_for(AppRole::AdminMaster);
        assert_eq!(keys(&menu.main), vec!["home", "powerbi", "tv_dashboards"]);
        assert_eq!(
            keys(&menu.admin),
            vec!["dashboard_management", "tv_management", "users", "powerbi_clients"]
        );
    }

    #[test]
    fn test_admin_gets_tv_but_no_admin_section() {
        let menu = NavigationService::menu_for(AppRole::Admin);
        assert_eq!(keys(&menu.main), vec!["home", "powerbi", "tv_dashboards"]);
        assert!(menu.admin.is_empty());
    }

    #[test]
    fn test_user_gets_home_and_powerbi() {
        let menu = NavigationService::menu_for(AppRole::User);
        assert_eq!(keys(&menu.main), vec!["home", "powerbi"]);
        assert!(menu.admin.is_empty());
    }
}
