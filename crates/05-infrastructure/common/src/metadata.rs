//! 元数据定义
//!
//! 提供服务类型标识和注册信息

use crate::lifecycle::InstanceStrategy;
use std::any::TypeId;
use std::fmt;

/// 服务类型标识
///
/// 由编译期的服务标识类型生成，可以比较和哈希。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceTypeInfo {
    /// 类型ID
    pub id: TypeId,
    /// 完整类型名称
    pub name: &'static str,
}

impl ServiceTypeInfo {
    /// 从类型获取类型信息，支持 `dyn Trait`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径和 `dyn` 前缀）
    pub fn short_name(&self) -> &'static str {
        // 去掉 `+ Send` 之类的附加约束，只保留主 trait
        let name = match self.name.find(" + ") {
            Some(index) => &self.name[..index],
            None => self.name,
        };
        // 泛型参数里也可能出现 "::"，只在外层路径里查找
        let outer_end = name.find('<').unwrap_or(name.len());
        match name[..outer_end].rfind("::") {
            Some(index) => &name[index + 2..],
            None => name.strip_prefix("dyn ").unwrap_or(name),
        }
    }

    /// 是否为 trait 对象
    pub fn is_trait_object(&self) -> bool {
        self.name.starts_with("dyn ")
    }
}

impl fmt::Display for ServiceTypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_trait_object() {
            write!(f, "dyn {}", self.short_name())
        } else {
            f.write_str(self.short_name())
        }
    }
}

/// 服务注册信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRegistrationInfo {
    /// 类型信息
    pub type_info: ServiceTypeInfo,
    /// 生命周期策略
    pub strategy: InstanceStrategy,
    /// 共享实例是否已创建
    pub instance_created: bool,
}
