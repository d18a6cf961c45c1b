//! 线程内解析链
//!
//! 工厂在调用线程上同步执行，嵌套解析形成一条链。节点在阻塞等待创建锁之前入链，
//! 同一线程重复进入某个节点时直接报告循环依赖，不会在自己持有的创建锁上死锁。
//! 跨线程形成的环无法通过这条链发现。

use di_abstractions::{ContainerOptions, ResolutionKey, ResolveContext};
use infrastructure_common::DependencyResult;
use std::cell::RefCell;
use tracing::warn;

thread_local! {
    static RESOLVE_CONTEXT: RefCell<ResolveContext> = RefCell::new(ResolveContext::new());
}

/// 解析链节点守卫，析构时出链
pub(crate) struct ResolutionGuard {
    _not_send: std::marker::PhantomData<*const ()>,
}

impl ResolutionGuard {
    /// 将节点加入当前线程的解析链
    pub fn enter(key: ResolutionKey, options: &ContainerOptions) -> DependencyResult<Self> {
        let pushed = RESOLVE_CONTEXT.with(|context| context.borrow_mut().push(key, options));
        if let Err(err) = pushed {
            warn!("解析中止: {}", err);
            return Err(err);
        }

        Ok(Self {
            _not_send: std::marker::PhantomData,
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLVE_CONTEXT.with(|context| {
            context.borrow_mut().pop();
        });
    }
}

/// 当前线程的解析深度
#[cfg(test)]
pub(crate) fn current_depth() -> usize {
    RESOLVE_CONTEXT.with(|context| context.borrow().depth())
}
