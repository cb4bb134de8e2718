//! The design-level retiming pass.

use crate::convert::{circuit_to_module, module_to_circuit};
use crate::delay::PropagationDelay;
use crate::error::RetimeError;
use gapl_common::Interner;
use gapl_graph::{minimize_clock_period, Retiming};
use gapl_ir::{module_name, Design, Module, ModuleId};
use tracing::{debug, info, warn};

/// What the pass aims for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetimeTarget {
    /// The smallest achievable clock period.
    Minimize,
    /// Any clock period at most this value.
    Period(i64),
}

/// The outcome for one retimed module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetimeReport {
    /// The module's ID in the design.
    pub module: ModuleId,
    /// Derived module name.
    pub name: String,
    /// Clock period before retiming.
    pub original_period: i64,
    /// Clock period after retiming.
    pub period: i64,
}

/// A retimed design and a report per retimed module.
#[derive(Debug)]
pub struct RetimedDesign {
    /// The design with retimed modules substituted.
    pub design: Design,
    /// One entry per module that was retimed.
    pub reports: Vec<RetimeReport>,
}

/// Retimes a single module.
///
/// Returns `Ok(None)` when the module is left alone: it has no registers, or
/// a register chain has no combinational source.
pub fn retime_module<D>(
    id: ModuleId,
    module: &Module,
    delay: &D,
    target: RetimeTarget,
    interner: &Interner,
) -> Result<Option<(Module, RetimeReport)>, RetimeError>
where
    D: PropagationDelay + ?Sized,
{
    if !module.has_registers() {
        return Ok(None);
    }
    let name = module_name(&module.invocation, interner);
    let Some(circuit) = module_to_circuit(module, delay, &name)? else {
        warn!(module = %name, "register without a combinational source, skipping retiming");
        return Ok(None);
    };
    let original_period = circuit.clock_period().map_err(RetimeError::graph(&name))?;

    let (retimed, period) = match target {
        RetimeTarget::Minimize => {
            let result = minimize_clock_period(&circuit).map_err(RetimeError::graph(&name))?;
            (result.circuit, result.period)
        }
        RetimeTarget::Period(target) => {
            let retiming = Retiming::retime_for_clock_period(&circuit, target)
                .map_err(RetimeError::graph(&name))?
                .ok_or_else(|| RetimeError::TargetUnreachable {
                    module: name.clone(),
                    target,
                    original: original_period,
                })?;
            let period = retiming.clock_period().map_err(RetimeError::graph(&name))?;
            let retimed = retiming
                .retimed_circuit()
                .map_err(RetimeError::graph(&name))?;
            (retimed, period)
        }
    };
    debug!(module = %name, nodes = retimed.graph().node_count(), "rebuilding retimed module");

    let rebuilt = circuit_to_module(module, &retimed, interner)?;
    info!(module = %name, original_period, period, "retimed module");
    Ok(Some((
        rebuilt,
        RetimeReport {
            module: id,
            name,
            original_period,
            period,
        },
    )))
}

/// Retimes every module of a design that contains registers.
///
/// Module interfaces are unchanged, so instances of retimed modules stay valid.
pub fn retime_design<D>(
    design: &Design,
    delay: &D,
    target: RetimeTarget,
    interner: &Interner,
) -> Result<RetimedDesign, RetimeError>
where
    D: PropagationDelay + ?Sized,
{
    let mut reports = Vec::new();
    let design = design.try_map(|id, module| -> Result<Module, RetimeError> {
        Ok(match retime_module(id, module, delay, target, interner)? {
            Some((retimed, report)) => {
                reports.push(report);
                retimed
            }
            None => module.clone(),
        })
    })?;
    info!(retimed = reports.len(), modules = design.len(), "retiming finished");
    Ok(RetimedDesign { design, reports })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Builder;
    use gapl_config::DelayModel;
    use gapl_ir::{InterfaceKind, InterfaceStructure, PredefinedFunction};

    fn design_of(module: Module) -> (Design, ModuleId) {
        let mut design = Design::new();
        let id = design.add_module(module);
        design.add_entry(id);
        (design, id)
    }

    #[test]
    fn minimizing_moves_registers_forward() {
        let interner = Interner::new();
        let builder = Builder::late_registers(&interner);
        let (design, id) = design_of(builder.module);
        let retimed =
            retime_design(&design, &DelayModel::default(), RetimeTarget::Minimize, &interner)
                .unwrap();

        assert_eq!(retimed.reports.len(), 1);
        let report = &retimed.reports[0];
        assert_eq!(report.module, id);
        assert_eq!(report.name, "top");
        assert_eq!(report.original_period, 3);
        assert_eq!(report.period, 1);

        let module = retimed.design.module(id);
        assert_eq!(module.nodes().values().filter(|n| n.is_register()).count(), 2);
        assert_eq!(module.connections().len(), 6);
        let circuit = module_to_circuit(module, &DelayModel::default(), "top")
            .unwrap()
            .unwrap();
        assert_eq!(circuit.clock_period().unwrap(), 1);
    }

    #[test]
    fn explicit_period_is_met() {
        let interner = Interner::new();
        let builder = Builder::late_registers(&interner);
        let (_, report) = retime_module(
            ModuleId::from_raw(0),
            &builder.module,
            &DelayModel::default(),
            RetimeTarget::Period(2),
            &interner,
        )
        .unwrap()
        .unwrap();
        assert!(report.period <= 2);
        assert_eq!(report.original_period, 3);
    }

    #[test]
    fn unreachable_period_is_reported() {
        let interner = Interner::new();
        let builder = Builder::late_registers(&interner);
        let err = retime_module(
            ModuleId::from_raw(0),
            &builder.module,
            &DelayModel::default(),
            RetimeTarget::Period(0),
            &interner,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RetimeError::TargetUnreachable { target: 0, original: 3, .. }
        ));
    }

    #[test]
    fn design_pass_stops_at_first_failing_module() {
        let interner = Interner::new();
        let builder = Builder::late_registers(&interner);
        let (design, _) = design_of(builder.module);
        let err = retime_design(&design, &DelayModel::default(), RetimeTarget::Period(0), &interner)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RetimeError::TargetUnreachable { target: 0, original: 3, .. }
        ));
    }

    #[test]
    fn modules_without_registers_are_untouched() {
        let interner = Interner::new();
        let mut builder = Builder::new(&interner, 1, InterfaceKind::Signal);
        let (a, b) = (builder.io("a"), builder.io("b"));
        let not = builder.add("n", PredefinedFunction::BitwiseNot { size: 1 });
        builder.link(a, 0, not, 0);
        builder.link(not, 0, b, 0);
        let (design, id) = design_of(builder.module);
        let retimed =
            retime_design(&design, &DelayModel::default(), RetimeTarget::Minimize, &interner)
                .unwrap();
        assert!(retimed.reports.is_empty());
        assert_eq!(retimed.design.module(id).connections().len(), 2);
    }

    #[test]
    fn undriven_registers_are_skipped() {
        let interner = Interner::new();
        let mut builder = Builder::new(&interner, 1, InterfaceKind::Signal);
        let b = builder.io("b");
        let reg = builder.add("r", PredefinedFunction::Register(InterfaceStructure::bus(1)));
        builder.link(reg, 0, b, 0);
        let result = retime_module(
            ModuleId::from_raw(0),
            &builder.module,
            &DelayModel::default(),
            RetimeTarget::Minimize,
            &interner,
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn optimal_modules_keep_their_period() {
        let interner = Interner::new();
        let builder = Builder::late_registers(&interner);
        let (design, id) = design_of(builder.module);
        let once =
            retime_design(&design, &DelayModel::default(), RetimeTarget::Minimize, &interner)
                .unwrap();
        let twice = retime_design(
            &once.design,
            &DelayModel::default(),
            RetimeTarget::Minimize,
            &interner,
        )
        .unwrap();
        assert_eq!(twice.reports[0].original_period, 1);
        assert_eq!(twice.reports[0].period, 1);
        assert_eq!(
            twice
                .design
                .module(id)
                .nodes()
                .values()
                .filter(|n| n.is_register())
                .count(),
            2
        );
    }
}
