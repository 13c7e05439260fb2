use std::future::Future;

///
/// ValueResolver
///
/// User-supplied conversion for one property or element. A generated
/// routine builds each resolver once from its own parameters and calls it
/// for every value that names it.
///

pub trait ValueResolver<S: ?Sized, D> {
    fn resolve(&self, source: &S) -> D;
}

///
/// AsyncValueResolver
///
/// Asynchronous counterpart of `ValueResolver`. Using one makes the
/// generated routine, and every routine that delegates to it, `async`.
///

pub trait AsyncValueResolver<S: ?Sized, D> {
    fn resolve(&self, source: &S) -> impl Future<Output = D>;
}
