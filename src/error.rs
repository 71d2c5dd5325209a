//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use thiserror::Error;

/// The error returned when a native timer resource could not be created.
/// 创建原生定时器资源失败时返回的错误。
///
/// Creation is the only fallible operation at the public boundary.
/// Cancellation and disposal failures are absorbed and logged, because the
/// resource is being torn down anyway.
///
/// 创建是公共边界上唯一可能失败的操作。取消与释放过程中的失败会被吸收并记录
/// 日志，因为资源本来就处于拆除过程中。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CreationError {
    /// The native facility ran out of timer resources.
    /// 原生设施的定时器资源已耗尽。
    #[error("native timer resources exhausted")]
    ResourceExhausted,

    /// The requested clock is not supported by this platform.
    /// 此平台不支持所请求的时钟。
    #[error("requested clock is not supported on this platform")]
    InvalidClock,

    /// The native facility denied permission to create the timer.
    /// 原生设施拒绝了创建定时器的权限。
    #[error("permission denied by the native timer facility")]
    PermissionDenied,

    /// The native facility failed with an unrecognized error code.
    /// 原生设施以无法识别的错误码失败。
    #[error("native timer facility failed with code {0}")]
    Unknown(i32),
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, CreationError>;

impl CreationError {
    /// Maps a native error code onto the creation error taxonomy.
    /// 将原生错误码映射到创建错误分类。
    #[cfg(unix)]
    pub(crate) fn from_os(code: i32) -> Self {
        match code {
            libc::EAGAIN | libc::ENOMEM => CreationError::ResourceExhausted,
            libc::EINVAL | libc::ENOTSUP => CreationError::InvalidClock,
            libc::EPERM => CreationError::PermissionDenied,
            other => CreationError::Unknown(other),
        }
    }

    /// Maps a native error code onto the creation error taxonomy.
    /// 将原生错误码映射到创建错误分类。
    #[cfg(windows)]
    pub(crate) fn from_os(code: i32) -> Self {
        // Win32 error codes, see winerror.h.
        const ERROR_ACCESS_DENIED: i32 = 5;
        const ERROR_NOT_ENOUGH_MEMORY: i32 = 8;
        const ERROR_NO_SYSTEM_RESOURCES: i32 = 1450;

        match code {
            ERROR_NOT_ENOUGH_MEMORY | ERROR_NO_SYSTEM_RESOURCES => {
                CreationError::ResourceExhausted
            }
            ERROR_ACCESS_DENIED => CreationError::PermissionDenied,
            other => CreationError::Unknown(other),
        }
    }

    /// Builds the creation error from the calling thread's last OS error.
    /// 从调用线程最近一次的系统错误构造创建错误。
    pub(crate) fn last_os() -> Self {
        let code = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
        Self::from_os(code)
    }
}
