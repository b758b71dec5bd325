// One-way reveal bookkeeping for scroll-animated elements.

#[derive(Clone, Debug)]
pub struct RevealTracker<N> {
    targets: Vec<(N, bool)>,
}

impl<N: PartialEq> RevealTracker<N> {
    pub fn new(targets: impl IntoIterator<Item = N>) -> Self {
        Self {
            targets: targets.into_iter().map(|n| (n, false)).collect(),
        }
    }

    /// Flip `node` to revealed. Returns true only on the first transition;
    /// untracked nodes and repeat calls return false.
    pub fn reveal(&mut self, node: &N) -> bool {
        match self.targets.iter_mut().find(|(n, _)| n == node) {
            Some((_, revealed)) if !*revealed => {
                *revealed = true;
                true
            }
            _ => false,
        }
    }

}
