//! 组合层测试

mod settings_tests;
