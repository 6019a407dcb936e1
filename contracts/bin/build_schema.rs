//! Binary for building contract schemas from odra modules.
#![doc = "Binary for building contract schemas from odra modules."]

#[allow(unused_imports)]
use collateral_lending_contracts;

fn main() {
    // Schema generation is driven by odra-build through `cargo odra schema`
}
