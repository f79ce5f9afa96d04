use thiserror::Error;

/// 代理创建错误
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Bean '{bean}' of type '{type_name}' does not expose '{interface}' and cannot be proxied")]
    InterfaceNotExposed {
        bean: String,
        type_name: &'static str,
        interface: &'static str,
    },
}

pub type ProxyResult<T> = Result<T, ProxyError>;
