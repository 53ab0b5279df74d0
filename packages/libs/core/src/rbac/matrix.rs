//! RBAC 권한 매트릭스
//!
//! 모듈 × 작업 선택 상태를 담는 희소 매트릭스입니다. 선택된 셀만
//! 저장하며, 모듈의 선택이 모두 해제되면 키 자체를 제거합니다.
//! 빈 집합과 키 없음은 구분하지 않습니다.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// 관리 대상 모듈
///
/// 선언 순서가 곧 고정 순서입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Module {
    UserManagement,
    CategoryManagement,
    OrderManagement,
    ProductManagement,
}

impl Module {
    /// 고정 순서의 전체 모듈 목록
    pub const ALL: [Module; 4] = [
        Module::UserManagement,
        Module::CategoryManagement,
        Module::OrderManagement,
        Module::ProductManagement,
    ];

    /// 화면/역할 이름 ("User Management")
    pub fn title(&self) -> &'static str {
        match self {
            Module::UserManagement => "User Management",
            Module::CategoryManagement => "Category Management",
            Module::OrderManagement => "Order Management",
            Module::ProductManagement => "Product Management",
        }
    }

    /// kebab-case 슬러그 ("user-management")
    pub fn slug(&self) -> &'static str {
        match self {
            Module::UserManagement => "user-management",
            Module::CategoryManagement => "category-management",
            Module::OrderManagement => "order-management",
            Module::ProductManagement => "product-management",
        }
    }

    /// 권한 설명 슬러그에 쓰는 첫 단어 ("user")
    pub fn domain(&self) -> &'static str {
        match self {
            Module::UserManagement => "user",
            Module::CategoryManagement => "category",
            Module::OrderManagement => "order",
            Module::ProductManagement => "product",
        }
    }

    /// 문자열에서 파싱 (슬러그/타이틀 모두 허용)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user-management" | "user management" => Some(Module::UserManagement),
            "category-management" | "category management" => Some(Module::CategoryManagement),
            "order-management" | "order management" => Some(Module::OrderManagement),
            "product-management" | "product management" => Some(Module::ProductManagement),
            _ => None,
        }
    }
}

impl Serialize for Module {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.slug())
    }
}

impl<'de> Deserialize<'de> for Module {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Module::from_str(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown module: {value}")))
    }
}

/// CRUD 작업 타입
///
/// 선언 순서가 곧 고정 순서입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Read,
    Write,
    Update,
    Delete,
}

impl Action {
    /// 고정 순서의 전체 작업 목록
    pub const ALL: [Action; 4] = [Action::Read, Action::Write, Action::Update, Action::Delete];

    /// 소문자 토큰 ("read")
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// 화면 표기 ("Read")
    pub fn title(&self) -> &'static str {
        match self {
            Action::Read => "Read",
            Action::Write => "Write",
            Action::Update => "Update",
            Action::Delete => "Delete",
        }
    }

    /// 문자열에서 파싱
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "read" => Some(Action::Read),
            "write" => Some(Action::Write),
            "update" => Some(Action::Update),
            "delete" => Some(Action::Delete),
            _ => None,
        }
    }
}

impl Serialize for Action {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Action::from_str(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown action: {value}")))
    }
}

/// 모듈 × 작업 선택 상태
///
/// `{ "<module-slug>": ["<action>", ...] }` 형태로 직렬화됩니다.
/// 로드 시 빈 작업 목록은 키 없음으로 정규화됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PermissionMatrix {
    cells: BTreeMap<Module, BTreeSet<Action>>,
}

impl PermissionMatrix {
    /// 빈 매트릭스 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 셀 토글
    ///
    /// 없는 모듈 키는 만들어서 선택하고, 해제로 모듈의 선택이 모두
    /// 사라지면 키를 제거합니다.
    pub fn toggle(&mut self, module: Module, action: Action) {
        let actions = self.cells.entry(module).or_default();
        if !actions.insert(action) {
            actions.remove(&action);
            if actions.is_empty() {
                self.cells.remove(&module);
            }
        }
    }

    /// 모듈 단위 일괄 토글
    ///
    /// 네 작업이 모두 선택된 경우에만 전체 해제, 그 외에는 전체 선택.
    pub fn toggle_all(&mut self, module: Module) {
        if self.all_selected(module) {
            self.cells.remove(&module);
        } else {
            self.cells.insert(module, Action::ALL.into_iter().collect());
        }
    }

    /// 셀 선택 여부
    pub fn is_selected(&self, module: Module, action: Action) -> bool {
        self.cells
            .get(&module)
            .map(|actions| actions.contains(&action))
            .unwrap_or(false)
    }

    /// 모듈의 네 작업이 모두 선택되어 있는지 여부
    pub fn all_selected(&self, module: Module) -> bool {
        self.cells
            .get(&module)
            .map(|actions| actions.len() == Action::ALL.len())
            .unwrap_or(false)
    }

    /// 모듈의 선택된 작업 목록 (고정 순서)
    pub fn selected(&self, module: Module) -> Vec<Action> {
        self.cells
            .get(&module)
            .map(|actions| actions.iter().copied().collect())
            .unwrap_or_default()
    }

    /// 선택이 남아 있는 모듈 목록 (고정 순서)
    pub fn modules(&self) -> Vec<Module> {
        self.cells.keys().copied().collect()
    }

    /// 전체 해제
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// 아무 선택도 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<'de> Deserialize<'de> for PermissionMatrix {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let mut cells = BTreeMap::<Module, BTreeSet<Action>>::deserialize(deserializer)?;
        // 빈 목록은 키 없음으로 정규화
        cells.retain(|_, actions| !actions.is_empty());
        Ok(Self { cells })
    }
}
