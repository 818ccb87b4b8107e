use argh::FromArgs;
use faer::Mat;
use rand::{rngs::StdRng, Rng, SeedableRng};

use ajd::uwedge::{uwedge, UwedgeParams};

#[derive(FromArgs)]
/// Jointly diagonalize a synthetic set of mixed diagonal matrices with uwedge
struct Args {
    /// dimension of the matrices
    #[argh(option, default = "10")]
    dim: usize,

    /// number of matrices in the set
    #[argh(option, default = "20")]
    num_matrices: usize,

    /// seed of the random generator
    #[argh(option, default = "0")]
    seed: u64,

    /// maximum number of iterations
    #[argh(option, default = "1000")]
    max_iter: usize,

    /// amplitude of the symmetric noise added to each matrix
    #[argh(option, default = "0.0")]
    noise: f64,

    /// keep the iterate with the smallest off-diagonal loss
    #[argh(switch)]
    minimize_loss: bool,

    /// print the summary as json
    #[argh(switch)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut rng = StdRng::seed_from_u64(args.seed);
    let matrices = synthetic_set(&mut rng, args.dim, args.num_matrices, args.noise);
    log::info!(
        "generated {} matrices of dim {}",
        matrices.len(),
        args.dim
    );

    let params = UwedgeParams {
        max_iter: args.max_iter,
        minimize_loss: args.minimize_loss,
        silent: false,
        ..Default::default()
    };
    let result = uwedge(&matrices, &params)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.summary())?);
    } else {
        println!("termination: {:?}", result.termination);
        println!("iterations: {}", result.iterations);
        println!("meanoffdiag: {:e}", result.meanoffdiag);
        println!("condition number: {:e}", result.condition_number());
    }

    Ok(())
}

/// `A * diag(r_i) * Aᵗ` for a random mixing `A` and random positive `r_i`.
fn synthetic_set(rng: &mut StdRng, dim: usize, num_matrices: usize, noise: f64) -> Vec<Mat<f64>> {
    let values = (0..dim * dim)
        .map(|_| rng.random_range(-1.0..1.0))
        .collect::<Vec<f64>>();
    let mixing = Mat::from_fn(dim, dim, |i, j| {
        values[i * dim + j] + if i == j { 2.0 } else { 0.0 }
    });

    (0..num_matrices)
        .map(|_| {
            let r = (0..dim)
                .map(|_| rng.random_range(0.5..2.0))
                .collect::<Vec<f64>>();
            let mut m = Mat::from_fn(dim, dim, |i, j| {
                (0..dim)
                    .map(|k| mixing[(i, k)] * r[k] * mixing[(j, k)])
                    .sum::<f64>()
            });
            for i in 0..dim {
                for j in i..dim {
                    let e = noise * rng.random_range(-1.0..1.0);
                    m[(i, j)] += e;
                    if i != j {
                        m[(j, i)] += e;
                    }
                }
            }
            m
        })
        .collect()
}
