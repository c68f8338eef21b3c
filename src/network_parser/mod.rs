//! 网络抓取模块入口。

pub(crate) mod network;
