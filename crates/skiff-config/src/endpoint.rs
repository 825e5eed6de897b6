//! Coordination service endpoints.

/// Anything that can name the coordination service a broker registers with.
///
/// Implemented for string types so a literal `"localhost:2181"` and a handle
/// to a running coordination service are accepted through the same seam.
pub trait CoordinationEndpoint {
    /// Connection string in `host:port[,host:port...][/chroot]` form.
    fn connection_string(&self) -> String;
}

impl CoordinationEndpoint for str {
    fn connection_string(&self) -> String {
        self.to_string()
    }
}

impl CoordinationEndpoint for String {
    fn connection_string(&self) -> String {
        self.clone()
    }
}

impl<T: CoordinationEndpoint + ?Sized> CoordinationEndpoint for &T {
    fn connection_string(&self) -> String {
        (**self).connection_string()
    }
}
