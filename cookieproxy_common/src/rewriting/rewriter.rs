/// A pure transformation over one half of a proxied exchange. Implementors take the input
/// by value and hand back a new value, so nothing is shared between in-flight requests.
pub trait Rewriter {
    type Input;
    type Output;

    fn rewrite(&self, input: Self::Input) -> Self::Output;
}
