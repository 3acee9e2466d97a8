use tracing::{info, warn};

use crate::{
    artifacts::ArtifactStore,
    chain::Transactor,
    configurator::Configurator,
    errors::DeploymentError,
    ledger::Ledger,
    plan::{DeploymentPlan, Step},
    runner::StepRunner,
};

/// Runs a plan from start to finish against one chain.
pub struct Deployment<'a, T: ?Sized> {
    transactor: &'a T,
    artifacts: &'a ArtifactStore,
    plan: &'a DeploymentPlan,
}

impl<'a, T: Transactor + ?Sized> Deployment<'a, T> {
    pub fn new(transactor: &'a T, artifacts: &'a ArtifactStore, plan: &'a DeploymentPlan) -> Self {
        Self {
            transactor,
            artifacts,
            plan,
        }
    }

    /// Executes every step in order and stops at the first failure. The
    /// plan and its artifacts are checked before the first transaction.
    /// Nothing is rolled back: whatever was deployed before a failure stays
    /// on chain and in `ledger`.
    pub async fn execute(&self, ledger: &mut Ledger) -> Result<(), DeploymentError> {
        self.plan.validate()?;
        self.artifacts.check(self.plan)?;

        let runner = StepRunner::new(self.transactor, self.artifacts);
        let configurator = Configurator::new(self.transactor);
        let total = self.plan.steps().len();
        for (i, step) in self.plan.steps().iter().enumerate() {
            info!(step = i + 1, total, label = step.label(), "starting step");
            let result = match step {
                Step::Deploy(step) => runner.run(step, ledger).await.map(|_| ()),
                Step::Call(step) => configurator.call(step, ledger).await.map(|_| ()),
                Step::Assert(step) => configurator.assert(step, ledger).await,
            };
            if let Err(err) = result {
                warn!(
                    step = i + 1,
                    deployed = ledger.contracts.len(),
                    "halting: {}",
                    err
                );
                return Err(err);
            }
        }
        info!(
            contracts = ledger.contracts.len(),
            transactions = ledger.configuration.len(),
            "deployment complete"
        );
        Ok(())
    }
}
