use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Teacher, // 教师
    Student, // 学生
}

impl UserRole {
    pub const TEACHER: &'static str = "teacher";
    pub const STUDENT: &'static str = "student";
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Teacher => write!(f, "{}", UserRole::TEACHER),
            UserRole::Student => write!(f, "{}", UserRole::STUDENT),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserRole::TEACHER => Ok(UserRole::Teacher),
            UserRole::STUDENT => Ok(UserRole::Student),
            _ => Err(format!(
                "无效的用户角色: '{s}'. 支持的角色: teacher, student"
            )),
        }
    }
}

/// 角色集合
///
/// 一个身份可以同时是教师和学生；授权只看集合中是否包含所需角色。
/// JSON 形式为角色字符串数组，例如 `["teacher"]`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<UserRole>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn teacher() -> Self {
        Self::from_iter([UserRole::Teacher])
    }

    pub fn student() -> Self {
        Self::from_iter([UserRole::Student])
    }

    /// 由数据库中的两个标志位构造
    pub fn from_flags(is_teacher: bool, is_student: bool) -> Self {
        let mut roles = Self::new();
        if is_teacher {
            roles.insert(UserRole::Teacher);
        }
        if is_student {
            roles.insert(UserRole::Student);
        }
        roles
    }

    pub fn insert(&mut self, role: UserRole) -> bool {
        self.0.insert(role)
    }

    pub fn contains(&self, role: UserRole) -> bool {
        self.0.contains(&role)
    }

    pub fn contains_any(&self, roles: &[UserRole]) -> bool {
        roles.iter().any(|role| self.contains(*role))
    }

    pub fn is_teacher(&self) -> bool {
        self.contains(UserRole::Teacher)
    }

    pub fn is_student(&self) -> bool {
        self.contains(UserRole::Student)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserRole> {
        self.0.iter()
    }
}

impl FromIterator<UserRole> for RoleSet {
    fn from_iter<I: IntoIterator<Item = UserRole>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.0.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", names.join(","))
    }
}

// 用户状态
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,    // 活跃
    Inactive,  // 非活跃
    Suspended, // 暂停
}

impl<'de> Deserialize<'de> for UserStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Inactive => write!(f, "inactive"),
            UserStatus::Suspended => write!(f, "suspended"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "suspended" => Ok(UserStatus::Suspended),
            _ => Err(format!("Invalid user status: {s}")),
        }
    }
}

// 用户实体（身份）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    pub password_hash: String,
    pub roles: RoleSet,
    pub status: UserStatus,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn is_teacher(&self) -> bool {
        self.roles.is_teacher()
    }

    pub fn is_student(&self) -> bool {
        self.roles.is_student()
    }

    // 生成访问令牌
    pub fn generate_access_token(&self) -> Result<String, String> {
        crate::utils::jwt::JwtUtils::generate_access_token(self.id, &self.roles.to_string())
            .map_err(|e| format!("生成 access token 失败: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_set_flags() {
        let roles = RoleSet::from_flags(true, false);
        assert!(roles.is_teacher());
        assert!(!roles.is_student());

        let both = RoleSet::from_flags(true, true);
        assert!(both.contains_any(&[UserRole::Student]));
        assert_eq!(both.to_string(), "teacher,student");

        assert!(RoleSet::from_flags(false, false).is_empty());
    }

    #[test]
    fn test_role_set_json() {
        let roles: RoleSet = serde_json::from_str(r#"["student","teacher","student"]"#).unwrap();
        assert!(roles.is_teacher() && roles.is_student());
        assert_eq!(serde_json::to_string(&roles).unwrap(), r#"["teacher","student"]"#);

        assert!(serde_json::from_str::<RoleSet>(r#"["admin"]"#).is_err());
    }
}
