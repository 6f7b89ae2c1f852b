//! Shared fixtures and finite-difference checks for closure tests.

use approx::assert_relative_eq;
use uom::si::{f64::MolarMass, molar_mass::gram_per_mole};

use crate::support::{config::Dictionary, thermo::Specie};

use super::EquationOfState;

pub(crate) fn air() -> Specie {
    Specie::new(MolarMass::new::<gram_per_mole>(28.96)).unwrap()
}

/// Detonation products of a TNT-like explosive.
pub(crate) fn jwlc_dictionary() -> Dictionary {
    Dictionary::new()
        .with("type", "JWLC")
        .with("rho0", 1630.0)
        .with("A", 371.2e9)
        .with("B", 3.231e9)
        .with("C", 1.045e9)
        .with("R1", 4.15)
        .with("R2", 0.95)
        .with("omega", 0.3)
}

/// Cochran–Chan parameters for unreacted TNT.
pub(crate) fn cochran_chan_dictionary() -> Dictionary {
    Dictionary::new()
        .with("type", "CochranChan")
        .with("rho0", 1840.0)
        .with("Gamma0", 0.8938)
        .with("A", 632.1e9)
        .with("B", -0.04472e9)
        .with("epsilon1", 4.94)
        .with("epsilon2", 0.15)
}

pub(crate) fn solid_jwl_dictionary() -> Dictionary {
    Dictionary::new()
        .with("type", "solidJWL")
        .with("rho0", 1905.0)
        .with("A", 778.1e9)
        .with("B", -5.031e9)
        .with("R1", 11.3)
        .with("R2", 1.13)
        .with("omega", 0.8938)
}

pub(crate) const TABLE_GAMMA: f64 = 1.4;
pub(crate) const TABLE_CV: f64 = 718.0;

/// Ideal gas tabulated on logarithmic axes, so `p = (γ − 1)ρe` and
/// `T = e/Cv` are reproduced exactly by the interpolant.
pub(crate) fn tabulated_ideal_gas_dictionary() -> Dictionary {
    let rhos = [1e-8, 1e-4, 1.0, 10.0, 100.0];
    let es = [1e4, 1e5, 1e6, 1e7];

    let mut p = Vec::new();
    let mut t = Vec::new();
    for &rho in &rhos {
        for &e in &es {
            p.push((TABLE_GAMMA - 1.0) * rho * e);
            t.push(e / TABLE_CV);
        }
    }

    Dictionary::new()
        .with("type", "tabulated")
        .with("rho", rhos.to_vec())
        .with("rhoTransform", "ln")
        .with("e", es.to_vec())
        .with("eTransform", "ln")
        .with("p", p)
        .with("pTransform", "ln")
        .with("T", t)
        .with("TTransform", "ln")
}

/// Central difference of `f` at `x` with a relative step.
pub(crate) fn central_difference(f: impl Fn(f64) -> f64, x: f64) -> f64 {
    let h = 1e-6 * x.abs().max(1e-3);
    (f(x + h) - f(x - h)) / (2.0 * h)
}

/// Checks the analytic derivatives of `eos` against finite differences of
/// its pressure at each `(ρ, e, T)` sample.
pub(crate) fn assert_derivatives_consistent(
    eos: &dyn EquationOfState,
    samples: &[(f64, f64, f64)],
) {
    for &(rho, e, t) in samples {
        let p = eos.pressure(rho, e, t);
        let scale = p.abs() + 1.0;

        let dpdrho = -eos.dpdv(rho, e, t) / (rho * rho);
        let dpdrho_fd = central_difference(|r| eos.pressure(r, e, t), rho);
        assert_relative_eq!(
            dpdrho,
            dpdrho_fd,
            max_relative = 1e-5,
            epsilon = 1e-6 * scale / rho
        );

        let dpde_fd = central_difference(|x| eos.pressure(rho, x, t), e);
        assert_relative_eq!(
            eos.dpde(rho, e, t),
            dpde_fd,
            max_relative = 1e-5,
            epsilon = 1e-6 * scale / (e.abs() + 1.0)
        );

        let dpdt_fd = central_difference(|x| eos.pressure(rho, e, x), t);
        assert_relative_eq!(
            eos.dpdt(rho, e, t),
            dpdt_fd,
            max_relative = 1e-5,
            epsilon = 1e-6 * scale / t
        );
    }
}

/// Checks the Mie–Grüneisen identities `p = (Γ − 1)ρe − Π` and
/// `c² = (Γ − 1)(e + p/ρ − δ)` at each `(ρ, e, T)` sample.
pub(crate) fn assert_mie_gruneisen_identities(
    eos: &dyn EquationOfState,
    samples: &[(f64, f64, f64)],
) {
    for &(rho, e, t) in samples {
        let p = eos.pressure(rho, e, t);
        let gamma = eos.gamma(rho, e, t);

        assert_relative_eq!(
            (gamma - 1.0) * rho * e - eos.pi(rho, e, t),
            p,
            max_relative = 1e-9,
            epsilon = 1e-9 * (p.abs() + 1.0)
        );

        let c2 = eos.speed_of_sound_sqr(p, rho, e, t);
        let c2_mg = (gamma - 1.0) * (e + p / rho - eos.delta(p, rho, e, t));
        assert_relative_eq!(c2, c2_mg, max_relative = 1e-7, epsilon = 1e-9 * c2.abs());
    }
}
