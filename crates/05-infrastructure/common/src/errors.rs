//! 错误类型定义

use crate::lifecycle::InstanceStrategy;
use thiserror::Error;

/// 装箱的通用错误类型，工厂和释放能力都使用它返回错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("服务未注册: {type_name}")]
    ServiceNotRegistered { type_name: String },

    #[error("访问方式不匹配: {type_name} 的策略为 {strategy}，请使用 get_scoped 并指定作用域")]
    WrongAccessor {
        type_name: String,
        strategy: InstanceStrategy,
    },

    #[error("服务创建失败: {type_name}, 原因: {source}")]
    FactoryFailed {
        type_name: String,
        source: BoxError,
    },

    #[error("服务释放失败: {type_name} (作用域 {scope_id}), 原因: {source}")]
    DisposalFailed {
        type_name: String,
        scope_id: String,
        source: BoxError,
    },

    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("解析深度超出限制: {type_name}, 最大深度 {max_depth}")]
    ResolutionDepthExceeded { type_name: String, max_depth: usize },

    #[error("类型转换失败: {type_name}")]
    TypeMismatch { type_name: String },
}

impl DependencyError {
    /// 创建未注册错误
    pub fn not_registered(type_name: impl Into<String>) -> Self {
        Self::ServiceNotRegistered {
            type_name: type_name.into(),
        }
    }

    /// 沿着嵌套的 `FactoryFailed` 找到最内层的依赖错误
    ///
    /// 工厂内部解析依赖失败时，错误会在每一层被包装一次，
    /// 调用方通常关心的是最初的失败原因。
    pub fn root_cause(&self) -> &DependencyError {
        let mut current = self;
        while let Self::FactoryFailed { source, .. } = current {
            match source.downcast_ref::<DependencyError>() {
                Some(inner) => current = inner,
                None => break,
            }
        }
        current
    }

    /// 根因是否为循环依赖
    pub fn is_circular_dependency(&self) -> bool {
        matches!(self.root_cause(), Self::CircularDependency { .. })
    }

    /// 根因是否为服务未注册
    pub fn is_not_registered(&self) -> bool {
        matches!(self.root_cause(), Self::ServiceNotRegistered { .. })
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("配置加载失败: {message}")]
    ConfigurationFailed { message: String },

    #[error("日志初始化失败: {message}")]
    LoggingFailed { message: String },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },

    #[error("基础设施关闭失败: {message}")]
    ShutdownFailed { message: String },
}

/// 结果类型别名
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
